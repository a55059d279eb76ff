//! RF attenuation mode: one RF element, IF always under 50 Hz AGC
//!
//! - `RFATT`: RF gain reduction of the LNA state in dB, higher means
//!   less gain

use super::{sorted_options, GainControl, GainRange, RfGainOptions, RFATT};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters};
use crate::search::{gr_to_lna_state, MatchMode};
use crate::table::{GainReductionRow, GainReductionTable};

/// RF attenuation with the IF gain left to the AGC
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfAttGain {
    table: GainReductionTable,
}

impl RfAttGain {
    pub fn new(model: HardwareModel) -> Self {
        Self {
            table: GainReductionTable::new(model),
        }
    }

    fn range(row: &GainReductionRow) -> GainRange {
        GainRange::new(f64::from(row.first()), f64::from(row.max_reduction()))
    }

    fn check_name(name: &str) -> Result<(), GainError> {
        if name == RFATT {
            Ok(())
        } else {
            Err(GainError::UnknownGain(name.to_string()))
        }
    }
}

impl GainControl for RfAttGain {
    fn list_gains(&self, _regs: &HardwareRegisters) -> Vec<&'static str> {
        vec![RFATT]
    }

    // AGC is not a client setting in this mode
    fn has_gain_mode(&self) -> bool {
        false
    }

    fn set_gain_mode(&mut self, _regs: &mut HardwareRegisters, _automatic: bool) -> bool {
        false
    }

    fn gain_mode(&self, _regs: &HardwareRegisters) -> bool {
        false
    }

    fn has_generic_gain(&self) -> bool {
        true
    }

    fn set_gain(&mut self, regs: &mut HardwareRegisters, value: f64) -> Result<bool, GainError> {
        self.set_named_gain(regs, RFATT, value)
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        Self::check_name(name)?;
        let row = self.table.row(regs)?;
        Self::range(&row).check(name, value)?;

        let mut changed = regs.set_agc(AgcControl::Hz50);
        if let Some(lna_state) = gr_to_lna_state(value, row.values(), MatchMode::Nearest) {
            changed |= regs.set_lna_state(lna_state);
        }
        Ok(changed)
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        self.named_gain(regs, RFATT)
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        Self::check_name(name)?;
        let row = self.table.row(regs)?;
        Ok(f64::from(row.reduction(regs.lna_state)?))
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        self.named_gain_range(regs, RFATT)
    }

    fn named_gain_range(
        &self,
        regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        Self::check_name(name)?;
        Ok(Self::range(&self.table.row(regs)?))
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        "RF Attenuation (dB)"
    }

    fn rf_gain_setting_options(
        &self,
        regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        let row = self.table.row(regs)?;
        let values = sorted_options(row.values().iter().map(|&gr| i32::from(gr)));
        Ok(RfGainOptions::middle_default(values))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        self.table.row(regs)?.reduction(regs.lna_state)
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        let row = self.table.row(regs)?;
        let lna_state = gr_to_lna_state(f64::from(value), row.values(), MatchMode::Exact).ok_or(
            GainError::NoExactMatch {
                name: self.rf_gain_setting_name().to_string(),
                value: f64::from(value),
            },
        )?;
        Ok(regs.set_lna_state(lna_state))
    }
}
