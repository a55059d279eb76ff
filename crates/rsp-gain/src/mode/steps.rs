//! Step mode: one combined control, AGC always off
//!
//! - `STEP`: 1-29, higher means more gain. Each step sets the LNA state
//!   and the IF gain reduction together from the calibration tables.

use super::{GainControl, GainRange, RfGainOptions, STEP};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters};
use crate::steps::{step_table, StepValues, DEFAULT_STEP, GAIN_STEPS};

/// Combined gain steps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepsGain {
    model: HardwareModel,
    step: u8,
}

impl StepsGain {
    /// Select the middle step and disable AGC
    pub fn new(model: HardwareModel, regs: &mut HardwareRegisters) -> Result<Self, GainError> {
        let mut mode = Self {
            model,
            step: DEFAULT_STEP,
        };
        mode.apply_step(regs, DEFAULT_STEP)?;
        regs.set_agc(AgcControl::Disabled);
        Ok(mode)
    }

    /// Currently selected step
    pub fn step(&self) -> u8 {
        self.step
    }

    fn range() -> GainRange {
        GainRange::stepped(1.0, f64::from(GAIN_STEPS), 1.0)
    }

    fn lookup(&self, regs: &HardwareRegisters, step: u8) -> Result<StepValues, GainError> {
        let table = step_table(self.model, regs.rf_hz, regs.antenna_port)?;
        table.lookup(step).ok_or(GainError::OutOfRange {
            name: STEP.to_string(),
            value: f64::from(step),
            min: 1.0,
            max: f64::from(GAIN_STEPS),
        })
    }

    fn apply_step(&mut self, regs: &mut HardwareRegisters, step: u8) -> Result<bool, GainError> {
        let values = self.lookup(regs, step)?;
        self.step = step;
        let mut changed = regs.set_lna_state(values.lna_state);
        changed |= regs.set_if_gain_reduction(values.if_gain_reduction_db);
        Ok(changed)
    }

    fn check_name(name: &str) -> Result<(), GainError> {
        if name == STEP {
            Ok(())
        } else {
            Err(GainError::UnknownGain(name.to_string()))
        }
    }
}

impl GainControl for StepsGain {
    fn list_gains(&self, _regs: &HardwareRegisters) -> Vec<&'static str> {
        vec![STEP]
    }

    // The step owns the IF gain reduction, so AGC stays off
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
        self.set_named_gain(regs, STEP, value)
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        Self::check_name(name)?;
        Self::range().check(name, value)?;

        let step = value as u8;
        let values = self.lookup(regs, step)?;
        self.step = step;
        let mut changed = regs.set_agc(AgcControl::Disabled);
        changed |= regs.set_lna_state(values.lna_state);
        changed |= regs.set_if_gain_reduction(values.if_gain_reduction_db);
        Ok(changed)
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        self.named_gain(regs, STEP)
    }

    fn named_gain(&self, _regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        Self::check_name(name)?;
        Ok(f64::from(self.step))
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        self.named_gain_range(regs, STEP)
    }

    fn named_gain_range(
        &self,
        _regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        Self::check_name(name)?;
        Ok(Self::range())
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        "Step"
    }

    fn rf_gain_setting_options(
        &self,
        _regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        Ok(RfGainOptions {
            values: (1..=i32::from(GAIN_STEPS)).collect(),
            default: i32::from(DEFAULT_STEP),
        })
    }

    fn read_rf_gain_setting(&self, _regs: &HardwareRegisters) -> Result<i32, GainError> {
        Ok(i32::from(self.step))
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        let step = u8::try_from(value)
            .ok()
            .filter(|step| (1..=GAIN_STEPS).contains(step))
            .ok_or(GainError::OutOfRange {
                name: self.rf_gain_setting_name().to_string(),
                value: f64::from(value),
                min: 1.0,
                max: f64::from(GAIN_STEPS),
            })?;
        self.apply_step(regs, step)
    }
}
