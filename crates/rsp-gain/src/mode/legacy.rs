//! Legacy mode: raw IF gain reduction and raw LNA state
//!
//! - `IFGR`: IF gain reduction in dB, higher means less gain (20-59)
//! - `RFGR`: LNA state, higher means less gain (0 to the model maximum)

use super::{
    if_gain_reduction_range, write_agc, write_if_gain_reduction, GainControl, GainRange,
    RfGainOptions, IFGR, RFGR,
};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters};

/// Name of the raw LNA state setting used by the legacy and IFGR modes
pub(crate) const RF_GAIN_SELECT: &str = "RF Gain Select";

/// Options of the raw LNA state setting
pub(crate) fn rf_gain_select_options(model: HardwareModel) -> RfGainOptions {
    RfGainOptions {
        values: (0..=i32::from(model.max_lna_state())).collect(),
        default: i32::from(model.rf_gain_select_default()),
    }
}

/// Validate and write a raw LNA state
pub(crate) fn write_raw_lna_state(
    model: HardwareModel,
    regs: &mut HardwareRegisters,
    name: &str,
    value: f64,
) -> Result<bool, GainError> {
    lna_state_range(model).check(name, value)?;
    Ok(regs.set_lna_state(value as u8))
}

fn lna_state_range(model: HardwareModel) -> GainRange {
    GainRange::stepped(0.0, f64::from(model.max_lna_state()), 1.0)
}

/// Raw register gain mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegacyGain {
    model: HardwareModel,
}

impl LegacyGain {
    pub fn new(model: HardwareModel) -> Self {
        Self { model }
    }
}

impl GainControl for LegacyGain {
    fn list_gains(&self, _regs: &HardwareRegisters) -> Vec<&'static str> {
        vec![IFGR, RFGR]
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
        false
    }

    fn set_gain(&mut self, _regs: &mut HardwareRegisters, _value: f64) -> Result<bool, GainError> {
        Err(GainError::NotSupported("combined gain"))
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        match name {
            IFGR => {
                if_gain_reduction_range().check(name, value)?;
                Ok(write_if_gain_reduction(regs, value as i32, IFGR))
            }
            RFGR => write_raw_lna_state(self.model, regs, name, value),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn gain(&self, _regs: &HardwareRegisters) -> Result<f64, GainError> {
        Err(GainError::NotSupported("combined gain"))
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        match name {
            IFGR => Ok(f64::from(regs.if_gain_reduction_db)),
            RFGR => Ok(f64::from(regs.lna_state)),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn gain_range(&self, _regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        Err(GainError::NotSupported("combined gain range"))
    }

    fn named_gain_range(
        &self,
        _regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        match name {
            IFGR => Ok(if_gain_reduction_range()),
            RFGR => Ok(lna_state_range(self.model)),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
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
