//! Normalized mode: RF and IF gain on a 0-100 scale
//!
//! - `RF`: position of the LNA state reduction within the current row,
//!   100 at the lowest reduction
//! - `IF`: position of the IF gain reduction within 20-59, 100 at 20

use super::{write_agc, write_if_gain_reduction, GainControl, GainRange, RfGainOptions, IF, RF};
use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters, MAX_BB_GR, NORMAL_MIN_GR};
use crate::search::{gr_to_lna_state, MatchMode};
use crate::table::{GainReductionRow, GainReductionTable};

const MAX_IF_GR: f64 = (MAX_BB_GR - NORMAL_MIN_GR) as f64;

/// Percentage options of the RF gain setting
const RF_GAIN_PERCENT_STEP: i32 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedGain {
    table: GainReductionTable,
}

impl NormalizedGain {
    pub fn new(model: HardwareModel) -> Self {
        Self {
            table: GainReductionTable::new(model),
        }
    }

    fn range() -> GainRange {
        GainRange::new(0.0, 100.0)
    }

    /// RF gain reduction of the current state above the row minimum, and
    /// the largest such reduction in the row
    fn rf_reduction(row: &GainReductionRow, lna_state: u8) -> Result<(f64, f64), GainError> {
        let rf_gr = f64::from(row.reduction(lna_state)? - row.first());
        let max_rf_gr = f64::from(row.max_reduction() - row.first());
        Ok((rf_gr, max_rf_gr))
    }

    fn rf_percent(row: &GainReductionRow, lna_state: u8) -> Result<f64, GainError> {
        let (rf_gr, max_rf_gr) = Self::rf_reduction(row, lna_state)?;
        let normalized_gr = if max_rf_gr > 0.0 { rf_gr / max_rf_gr } else { 0.0 };
        Ok(100.0 * (1.0 - normalized_gr))
    }

    fn lna_state_for(row: &GainReductionRow, percent: f64) -> Option<u8> {
        let normalized_gr = 1.0 - percent / 100.0;
        let first = f64::from(row.first());
        let target = first + normalized_gr * (f64::from(row.max_reduction()) - first);
        gr_to_lna_state(target, row.values(), MatchMode::Nearest)
    }

    fn write_rf(&self, regs: &mut HardwareRegisters, percent: f64) -> Result<bool, GainError> {
        let row = self.table.row(regs)?;
        Ok(match Self::lna_state_for(&row, percent) {
            Some(lna_state) => regs.set_lna_state(lna_state),
            None => false,
        })
    }

    fn write_if(regs: &mut HardwareRegisters, percent: f64) -> bool {
        let normalized_gr = 1.0 - percent / 100.0;
        let gr_db = (f64::from(NORMAL_MIN_GR) + normalized_gr * (MAX_IF_GR + 0.4999)) as i32;
        write_if_gain_reduction(regs, gr_db, IF)
    }

    fn rf_setting_options() -> Vec<i32> {
        (0..=100).step_by(RF_GAIN_PERCENT_STEP as usize).collect()
    }
}

impl GainControl for NormalizedGain {
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
        Self::range().check("gain", value)?;
        let mut changed = self.write_rf(regs, value)?;
        changed |= Self::write_if(regs, value);
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
            RF => self.write_rf(regs, value),
            _ => Ok(Self::write_if(regs, value)),
        }
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        let row = self.table.row(regs)?;
        let (rf_gr, max_rf_gr) = Self::rf_reduction(&row, regs.lna_state)?;
        let if_gr = f64::from(regs.if_gain_reduction_db - NORMAL_MIN_GR);
        let normalized_gr = (rf_gr + if_gr) / (max_rf_gr + MAX_IF_GR);
        Ok(100.0 * (1.0 - normalized_gr))
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        match name {
            RF => Self::rf_percent(&self.table.row(regs)?, regs.lna_state),
            IF => {
                let if_gr = f64::from(regs.if_gain_reduction_db - NORMAL_MIN_GR);
                Ok(100.0 * (1.0 - if_gr / MAX_IF_GR))
            }
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn gain_range(&self, _regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        Ok(Self::range())
    }

    fn named_gain_range(
        &self,
        _regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        match name {
            RF | IF => Ok(Self::range()),
            _ => Err(GainError::UnknownGain(name.to_string())),
        }
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        "RF Gain (%)"
    }

    fn rf_gain_setting_options(
        &self,
        _regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        Ok(RfGainOptions::middle_default(Self::rf_setting_options()))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        let percent = Self::rf_percent(&self.table.row(regs)?, regs.lna_state)?;
        let mut closest = 0;
        let mut min_diff = f64::INFINITY;
        for option in Self::rf_setting_options() {
            let diff = (percent - f64::from(option)).abs();
            if diff < min_diff {
                closest = option;
                min_diff = diff;
            }
        }
        Ok(closest)
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        Self::range().check(self.rf_gain_setting_name(), f64::from(value))?;
        self.write_rf(regs, f64::from(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized(rf_hz: f64) -> (NormalizedGain, HardwareRegisters) {
        let mut regs = HardwareRegisters::tuned_to(rf_hz);
        regs.agc = AgcControl::Disabled;
        (NormalizedGain::new(HardwareModel::Rsp1A), regs)
    }

    #[test]
    fn test_full_and_zero_gain() {
        let (mut mode, mut regs) = normalized(100e6);
        mode.set_gain(&mut regs, 100.0).unwrap();
        assert_eq!(regs.lna_state, 0);
        assert_eq!(regs.if_gain_reduction_db, 20);
        assert_eq!(mode.gain(&regs), Ok(100.0));

        mode.set_gain(&mut regs, 0.0).unwrap();
        assert_eq!(regs.lna_state, 9);
        assert_eq!(regs.if_gain_reduction_db, 59);
        assert_eq!(mode.gain(&regs), Ok(0.0));
    }

    #[test]
    fn test_rf_percent() {
        // Row {0,6,12,18,20,26,32,38,57,62}; 50% targets 31 -> state 6 (32)
        let (mut mode, mut regs) = normalized(100e6);
        assert_eq!(mode.set_named_gain(&mut regs, RF, 50.0), Ok(true));
        assert_eq!(regs.lna_state, 6);
        let percent = mode.named_gain(&regs, RF).unwrap();
        assert!((percent - 100.0 * (1.0 - 32.0 / 62.0)).abs() < 1e-9);
    }

    #[test]
    fn test_if_percent() {
        let (mut mode, mut regs) = normalized(100e6);
        // 20 + 0.5 * 39.4999 = 39.74 -> 39
        assert_eq!(mode.set_named_gain(&mut regs, IF, 50.0), Ok(true));
        assert_eq!(regs.if_gain_reduction_db, 39);
    }

    #[test]
    fn test_if_skipped_under_agc() {
        let (mut mode, mut regs) = normalized(100e6);
        assert!(mode.set_gain_mode(&mut regs, true));
        assert_eq!(regs.agc, AgcControl::CtrlEnabled);
        assert_eq!(mode.set_named_gain(&mut regs, IF, 100.0), Ok(false));
        assert_eq!(regs.if_gain_reduction_db, 50);
    }

    #[test]
    fn test_rf_gain_setting() {
        let (mut mode, mut regs) = normalized(100e6);
        let options = mode.rf_gain_setting_options(&regs).unwrap();
        assert_eq!(options.values.len(), 21);
        assert_eq!(options.default, 50);

        assert_eq!(mode.write_rf_gain_setting(&mut regs, 50), Ok(true));
        // 48.39% is closest to 50
        assert_eq!(mode.read_rf_gain_setting(&regs), Ok(50));
        assert!(mode.write_rf_gain_setting(&mut regs, 101).is_err());
    }

    #[test]
    fn test_out_of_range() {
        let (mut mode, mut regs) = normalized(100e6);
        assert!(mode.set_gain(&mut regs, -1.0).is_err());
        assert!(mode.set_named_gain(&mut regs, RF, 100.5).is_err());
        assert!(mode.set_named_gain(&mut regs, "IFGR", 50.0).is_err());
    }
}
