//! IF gain reduction mode; the LNA state is chosen through the
//! "RF Gain Select" setting.

use super::legacy::{rf_gain_select_options, write_raw_lna_state, RF_GAIN_SELECT};
use super::{
    if_gain_reduction_range, write_agc, write_if_gain_reduction, GainControl, GainRange,
    RfGainOptions, IFGR,
};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IfGrGain {
    model: HardwareModel,
}

impl IfGrGain {
    pub fn new(model: HardwareModel) -> Self {
        Self { model }
    }

    fn check_name(name: &str) -> Result<(), GainError> {
        if name == IFGR {
            Ok(())
        } else {
            Err(GainError::UnknownGain(name.to_string()))
        }
    }
}

impl GainControl for IfGrGain {
    fn list_gains(&self, _regs: &HardwareRegisters) -> Vec<&'static str> {
        vec![IFGR]
    }

    fn has_gain_mode(&self) -> bool {
        true
    }

    // RF is fixed by the client, so the slower 50 Hz loop is used
    fn set_gain_mode(&mut self, regs: &mut HardwareRegisters, automatic: bool) -> bool {
        write_agc(regs, automatic, AgcControl::Hz50)
    }

    fn gain_mode(&self, regs: &HardwareRegisters) -> bool {
        regs.agc.is_enabled()
    }

    fn has_generic_gain(&self) -> bool {
        false
    }

    fn set_gain(&mut self, regs: &mut HardwareRegisters, value: f64) -> Result<bool, GainError> {
        self.set_named_gain(regs, IFGR, value)
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        Self::check_name(name)?;
        if_gain_reduction_range().check(name, value)?;
        Ok(write_if_gain_reduction(regs, value as i32, IFGR))
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        self.named_gain(regs, IFGR)
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        Self::check_name(name)?;
        Ok(f64::from(regs.if_gain_reduction_db))
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        self.named_gain_range(regs, IFGR)
    }

    fn named_gain_range(
        &self,
        _regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        Self::check_name(name)?;
        Ok(if_gain_reduction_range())
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        RF_GAIN_SELECT
    }

    fn rf_gain_setting_options(
        &self,
        _regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        Ok(rf_gain_select_options(self.model))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        Ok(i32::from(regs.lna_state))
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        write_raw_lna_state(self.model, regs, RF_GAIN_SELECT, f64::from(value))
    }
}
