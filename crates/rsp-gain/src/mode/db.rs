//! dB mode: RF and IF expressed as gain in dB
//!
//! - `RF`: highest reduction of the current row minus the reduction of
//!   the LNA state, so higher means more gain
//! - `IF`: 79 minus the IF gain reduction (20-59)

use super::{
    if_gain_reduction_range, sorted_options, split_combined_gain, write_agc,
    write_if_gain_reduction, GainControl, GainRange, RfGainOptions, IF, RF,
};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters, MAX_BB_GR, NORMAL_MIN_GR};
use crate::search::{gr_to_lna_state, MatchMode};
use crate::table::{GainReductionRow, GainReductionTable};

const IF_GAIN_OFFSET: i32 = NORMAL_MIN_GR + MAX_BB_GR;

/// Gain in dB over the table-driven LNA states
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbGain {
    table: GainReductionTable,
}

impl DbGain {
    pub fn new(model: HardwareModel) -> Self {
        Self {
            table: GainReductionTable::new(model),
        }
    }

    fn rf_gain(row: &GainReductionRow, lna_state: u8) -> Result<i32, GainError> {
        Ok(row.max_reduction() - row.reduction(lna_state)?)
    }

    fn rf_range(row: &GainReductionRow) -> GainRange {
        GainRange::new(f64::from(row.first()), f64::from(row.max_reduction()))
    }

    fn write_rf(row: &GainReductionRow, regs: &mut HardwareRegisters, value: f64) -> bool {
        let target = f64::from(row.max_reduction()) - value;
        match gr_to_lna_state(target, row.values(), MatchMode::Nearest) {
            Some(lna_state) => regs.set_lna_state(lna_state),
            None => false,
        }
    }

    fn write_if(regs: &mut HardwareRegisters, value: f64) -> bool {
        write_if_gain_reduction(regs, IF_GAIN_OFFSET - value as i32, IF)
    }
}

impl GainControl for DbGain {
    fn list_gains(&self, _regs: &HardwareRegisters) -> Vec<&'static str> {
        vec![RF, IF]
    }

    fn has_gain_mode(&self) -> bool {
        true
    }

    fn set_gain_mode(&mut self, regs: &mut HardwareRegisters, automatic: bool) -> bool {
        write_agc(regs, automatic, AgcControl::CtrlEnabled)
    }

    fn gain_mode(&self, regs: &HardwareRegisters) -> bool {
        regs.agc.is_enabled()
    }

    fn has_generic_gain(&self) -> bool {
        true
    }

    fn set_gain(&mut self, regs: &mut HardwareRegisters, value: f64) -> Result<bool, GainError> {
        let row = self.table.row(regs)?;
        self.gain_range(regs)?.check("gain", value)?;

        let max = row.max_reduction();
        let rf_gains: Vec<f64> = row
            .values()
            .iter()
            .map(|&gr| f64::from(max - i32::from(gr)))
            .collect();
        let Some((lna_state, if_gain)) =
            split_combined_gain(value, Self::rf_range(&row), if_gain_reduction_range(), &rf_gains)
        else {
            return Ok(false);
        };

        let mut changed = regs.set_lna_state(lna_state);
        changed |= Self::write_if(regs, if_gain);
        Ok(changed)
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        self.named_gain_range(regs, name)?.check(name, value)?;
        match name {
            RF => {
                let row = self.table.row(regs)?;
                Ok(Self::write_rf(&row, regs, value))
            }
            _ => Ok(Self::write_if(regs, value)),
        }
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        Ok(self.named_gain(regs, RF)? + self.named_gain(regs, IF)?)
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        match name {
            RF => {
                let row = self.table.row(regs)?;
                Ok(f64::from(Self::rf_gain(&row, regs.lna_state)?))
            }
            IF => Ok(f64::from(IF_GAIN_OFFSET - regs.if_gain_reduction_db)),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        let rf = self.named_gain_range(regs, RF)?;
        let if_range = if_gain_reduction_range();
        Ok(GainRange::new(rf.min + if_range.min, rf.max + if_range.max))
    }

    fn named_gain_range(
        &self,
        regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        match name {
            RF => Ok(Self::rf_range(&self.table.row(regs)?)),
            IF => Ok(if_gain_reduction_range()),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        "RF Gain (dB)"
    }

    fn rf_gain_setting_options(
        &self,
        regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        let row = self.table.row(regs)?;
        let max = row.max_reduction();
        let values = sorted_options(row.values().iter().map(|&gr| max - i32::from(gr)));
        Ok(RfGainOptions::middle_default(values))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        let row = self.table.row(regs)?;
        Self::rf_gain(&row, regs.lna_state)
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        let row = self.table.row(regs)?;
        let target = f64::from(row.max_reduction() - value);
        let lna_state = gr_to_lna_state(target, row.values(), MatchMode::Exact).ok_or(
            GainError::NoExactMatch {
                name: self.rf_gain_setting_name().to_string(),
                value: f64::from(value),
            },
        )?;
        Ok(regs.set_lna_state(lna_state))
    }
}
