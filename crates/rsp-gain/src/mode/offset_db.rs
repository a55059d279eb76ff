//! Offset dB mode: gains in dB relative to fixed offsets
//!
//! - `RF`: RF offset minus the LNA state reduction
//! - `IF`: IF offset minus the IF gain reduction
//!
//! With the default offsets of 0 both gains are non-positive. The IF
//! element and the combined gain are unavailable while AGC is enabled.

use tracing::error;

use super::{
    sorted_options, split_combined_gain, write_agc, GainControl, GainRange, RfGainOptions, IF, RF,
};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters, MAX_BB_GR, NORMAL_MIN_GR};
use crate::search::{gr_to_lna_state, MatchMode};
use crate::table::{GainReductionRow, GainReductionTable};

/// Offsets the gains are measured from, in dB
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DbOffsets {
    pub rf_db: i32,
    pub if_db: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetDbGain {
    table: GainReductionTable,
    offsets: DbOffsets,
}

impl OffsetDbGain {
    pub fn new(model: HardwareModel, offsets: DbOffsets) -> Self {
        Self {
            table: GainReductionTable::new(model),
            offsets,
        }
    }

    pub fn offsets(&self) -> DbOffsets {
        self.offsets
    }

    fn rf_range(&self, row: &GainReductionRow) -> GainRange {
        GainRange::new(
            f64::from(self.offsets.rf_db - row.max_reduction()),
            f64::from(self.offsets.rf_db - row.first()),
        )
    }

    fn if_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        if regs.agc.is_enabled() {
            return Err(GainError::GainUnavailable(IF.to_string()));
        }
        Ok(GainRange::stepped(
            f64::from(self.offsets.if_db - MAX_BB_GR),
            f64::from(self.offsets.if_db - NORMAL_MIN_GR),
            1.0,
        ))
    }

    fn rf_gain(&self, row: &GainReductionRow, lna_state: u8) -> Result<i32, GainError> {
        Ok(self.offsets.rf_db - row.reduction(lna_state)?)
    }

    fn if_gain_reduction(&self, if_gain: f64) -> i32 {
        self.offsets.if_db - if_gain as i32
    }
}

impl GainControl for OffsetDbGain {
    fn list_gains(&self, regs: &HardwareRegisters) -> Vec<&'static str> {
        if regs.agc.is_enabled() {
            vec![RF]
        } else {
            vec![RF, IF]
        }
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
        let if_range = self.if_range(regs)?;
        let row = self.table.row(regs)?;
        let rf_range = self.rf_range(&row);
        GainRange::new(rf_range.min + if_range.min, rf_range.max + if_range.max)
            .check("gain", value)?;

        let rf_gains: Vec<f64> = row
            .values()
            .iter()
            .map(|&gr| f64::from(self.offsets.rf_db - i32::from(gr)))
            .collect();
        let Some((lna_state, if_gain)) = split_combined_gain(value, rf_range, if_range, &rf_gains)
        else {
            return Ok(false);
        };

        let mut changed = regs.set_lna_state(lna_state);
        changed |= regs.set_if_gain_reduction(self.if_gain_reduction(if_gain));
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
                let target = f64::from(self.offsets.rf_db) - value;
                Ok(
                    match gr_to_lna_state(target, row.values(), MatchMode::Nearest) {
                        Some(lna_state) => regs.set_lna_state(lna_state),
                        None => false,
                    },
                )
            }
            _ => Ok(regs.set_if_gain_reduction(self.if_gain_reduction(value))),
        }
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        Ok(self.named_gain(regs, RF)? + self.named_gain(regs, IF)?)
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        match name {
            RF => {
                let row = self.table.row(regs)?;
                Ok(f64::from(self.rf_gain(&row, regs.lna_state)?))
            }
            IF => {
                if regs.agc.is_enabled() {
                    error!("IF gain read while AGC is enabled");
                }
                Ok(f64::from(self.offsets.if_db - regs.if_gain_reduction_db))
            }
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        let rf = self.named_gain_range(regs, RF)?;
        let if_range = self.if_range(regs)?;
        Ok(GainRange::new(rf.min + if_range.min, rf.max + if_range.max))
    }

    fn named_gain_range(
        &self,
        regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        match name {
            RF => Ok(self.rf_range(&self.table.row(regs)?)),
            IF => self.if_range(regs),
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
        let values = sorted_options(
            row.values()
                .iter()
                .map(|&gr| self.offsets.rf_db - i32::from(gr)),
        );
        Ok(RfGainOptions::middle_default(values))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        let row = self.table.row(regs)?;
        self.rf_gain(&row, regs.lna_state)
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        let row = self.table.row(regs)?;
        let target = f64::from(self.offsets.rf_db - value);
        let lna_state = gr_to_lna_state(target, row.values(), MatchMode::Exact).ok_or(
            GainError::NoExactMatch {
                name: self.rf_gain_setting_name().to_string(),
                value: f64::from(value),
            },
        )?;
        Ok(regs.set_lna_state(lna_state))
    }
}
