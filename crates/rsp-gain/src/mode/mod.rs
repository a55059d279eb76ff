//! Gain mode strategies
//!
//! A gain mode presents the two hardware gain registers (LNA state and
//! IF gain reduction) and the AGC register to clients in one particular
//! vocabulary. Every mode implements [`GainControl`]; the closed set of
//! modes is wrapped by [`GainMode`], which the device selects once at
//! open time from a [`GainModeKind`].
//!
//! Modes never own the registers. Each call borrows the device's
//! [`HardwareRegisters`] and reports whether a register changed, so the
//! caller knows when a hardware update is due.

mod db;
mod ifgr;
mod legacy;
mod normalized;
mod offset_db;
mod rfatt;
mod steps;

use std::fmt;
use std::str::FromStr;

use tracing::{debug, warn};

use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AgcControl, HardwareRegisters, MAX_BB_GR, NORMAL_MIN_GR};

pub use db::DbGain;
pub use ifgr::IfGrGain;
pub use legacy::LegacyGain;
pub use normalized::NormalizedGain;
pub use offset_db::{DbOffsets, OffsetDbGain};
pub use rfatt::RfAttGain;
pub use steps::StepsGain;

/// Legacy IF gain reduction element
pub const IFGR: &str = "IFGR";
/// Legacy RF gain reduction element (raw LNA state)
pub const RFGR: &str = "RFGR";
/// RF gain element
pub const RF: &str = "RF";
/// IF gain element
pub const IF: &str = "IF";
/// RF attenuation element
pub const RFATT: &str = "RFATT";
/// Combined gain step element
pub const STEP: &str = "STEP";

/// Closed interval a gain element accepts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GainRange {
    pub min: f64,
    pub max: f64,
    /// Resolution of the element, 0 when continuous
    pub step: f64,
}

impl GainRange {
    /// Continuous range
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max, step: 0.0 }
    }

    /// Range with a fixed resolution
    pub fn stepped(min: f64, max: f64, step: f64) -> Self {
        Self { min, max, step }
    }

    /// The `[0, 0]` range reported when no range is available
    pub fn empty() -> Self {
        Self::new(0.0, 0.0)
    }

    /// Whether `value` lies within the range; NaN never does
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// Reject `value` for element `name` unless it lies within the range
    pub fn check(&self, name: &str, value: f64) -> Result<(), GainError> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(GainError::OutOfRange {
                name: name.to_string(),
                value,
                min: self.min,
                max: self.max,
            })
        }
    }
}

/// Option list of the coarse RF gain setting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RfGainOptions {
    /// Selectable values in ascending order
    pub values: Vec<i32>,
    /// Value to preselect
    pub default: i32,
}

impl RfGainOptions {
    /// Options with the middle entry as default
    pub fn middle_default(values: Vec<i32>) -> Self {
        let default = values.get(values.len() / 2).copied().unwrap_or(0);
        Self { values, default }
    }
}

/// Client-facing gain surface shared by every gain mode
pub trait GainControl {
    /// Named gain elements available in the current AGC state
    fn list_gains(&self, regs: &HardwareRegisters) -> Vec<&'static str>;

    /// Whether the client can toggle AGC
    fn has_gain_mode(&self) -> bool;

    /// Enable or disable AGC, returning whether the AGC register changed
    fn set_gain_mode(&mut self, regs: &mut HardwareRegisters, automatic: bool) -> bool;

    /// Whether AGC is reported as enabled
    fn gain_mode(&self, regs: &HardwareRegisters) -> bool;

    /// Whether the combined gain is a meaningful client control
    fn has_generic_gain(&self) -> bool;

    /// Set the combined gain, returning whether a register changed
    fn set_gain(&mut self, regs: &mut HardwareRegisters, value: f64) -> Result<bool, GainError>;

    /// Set one named gain element, returning whether a register changed
    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError>;

    /// Combined gain
    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError>;

    /// Value of one named gain element
    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError>;

    /// Range of the combined gain
    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError>;

    /// Range of one named gain element
    fn named_gain_range(&self, regs: &HardwareRegisters, name: &str)
        -> Result<GainRange, GainError>;

    /// Display name of the coarse RF gain setting
    fn rf_gain_setting_name(&self) -> &'static str;

    /// Options of the coarse RF gain setting
    fn rf_gain_setting_options(&self, regs: &HardwareRegisters)
        -> Result<RfGainOptions, GainError>;

    /// Current value of the coarse RF gain setting
    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError>;

    /// Write the coarse RF gain setting, returning whether a register changed
    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError>;
}

/// Selectable gain modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum GainModeKind {
    /// Raw IF gain reduction and LNA state
    Legacy,
    /// RF and IF gain in dB
    #[default]
    Db,
    /// RF attenuation only, AGC always on
    RfAtt,
    /// Combined calibration steps, AGC always off
    Steps,
    /// IF gain reduction only, RF through the RF gain setting
    IfGr,
    /// RF and IF gain on a 0-100 scale
    Normalized,
    /// RF and IF gain in dB relative to fixed offsets, IF unavailable under AGC
    OffsetDb,
}

impl GainModeKind {
    /// All gain modes
    pub fn all() -> &'static [GainModeKind] {
        &[
            GainModeKind::Legacy,
            GainModeKind::Db,
            GainModeKind::RfAtt,
            GainModeKind::Steps,
            GainModeKind::IfGr,
            GainModeKind::Normalized,
            GainModeKind::OffsetDb,
        ]
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Db => "db",
            Self::RfAtt => "rfatt",
            Self::Steps => "steps",
            Self::IfGr => "ifgr",
            Self::Normalized => "normalized",
            Self::OffsetDb => "offsetdb",
        }
    }

    /// Get description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Legacy => "IFGR and RFGR as raw gain reduction values",
            Self::Db => "RF and IF gain in dB, higher means more gain",
            Self::RfAtt => "RF attenuation in dB with IF under AGC",
            Self::Steps => "Single 1-29 gain step setting LNA state and IF together",
            Self::IfGr => "IF gain reduction with RF set through RF Gain Select",
            Self::Normalized => "RF and IF gain as a percentage",
            Self::OffsetDb => "RF and IF gain in dB from fixed offsets, IF locked by AGC",
        }
    }
}

impl fmt::Display for GainModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GainModeKind {
    type Err = GainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| GainError::UnknownGainMode(s.to_string()))
    }
}

/// The active gain mode of a device
#[derive(Debug, Clone, PartialEq)]
pub enum GainMode {
    Legacy(LegacyGain),
    Db(DbGain),
    RfAtt(RfAttGain),
    Steps(StepsGain),
    IfGr(IfGrGain),
    Normalized(NormalizedGain),
    OffsetDb(OffsetDbGain),
}

macro_rules! dispatch {
    ($self:expr, $mode:ident => $call:expr) => {
        match $self {
            GainMode::Legacy($mode) => $call,
            GainMode::Db($mode) => $call,
            GainMode::RfAtt($mode) => $call,
            GainMode::Steps($mode) => $call,
            GainMode::IfGr($mode) => $call,
            GainMode::Normalized($mode) => $call,
            GainMode::OffsetDb($mode) => $call,
        }
    };
}

impl GainMode {
    /// Build the gain mode for a device.
    ///
    /// Modes that impose an AGC policy or initial gain write it to `regs`
    /// here; the step mode fails if no step table covers the tuned
    /// frequency.
    pub fn new(
        kind: GainModeKind,
        model: HardwareModel,
        regs: &mut HardwareRegisters,
        offsets: DbOffsets,
    ) -> Result<Self, GainError> {
        let mode = match kind {
            GainModeKind::Legacy => GainMode::Legacy(LegacyGain::new(model)),
            GainModeKind::Db => GainMode::Db(DbGain::new(model)),
            GainModeKind::RfAtt => GainMode::RfAtt(RfAttGain::new(model)),
            GainModeKind::Steps => GainMode::Steps(StepsGain::new(model, regs)?),
            GainModeKind::IfGr => GainMode::IfGr(IfGrGain::new(model)),
            GainModeKind::Normalized => GainMode::Normalized(NormalizedGain::new(model)),
            GainModeKind::OffsetDb => GainMode::OffsetDb(OffsetDbGain::new(model, offsets)),
        };
        debug!("Gain mode {} selected for {}", kind, model);
        Ok(mode)
    }

    /// Which mode this is
    pub fn kind(&self) -> GainModeKind {
        match self {
            GainMode::Legacy(_) => GainModeKind::Legacy,
            GainMode::Db(_) => GainModeKind::Db,
            GainMode::RfAtt(_) => GainModeKind::RfAtt,
            GainMode::Steps(_) => GainModeKind::Steps,
            GainMode::IfGr(_) => GainModeKind::IfGr,
            GainMode::Normalized(_) => GainModeKind::Normalized,
            GainMode::OffsetDb(_) => GainModeKind::OffsetDb,
        }
    }
}

impl GainControl for GainMode {
    fn list_gains(&self, regs: &HardwareRegisters) -> Vec<&'static str> {
        dispatch!(self, m => m.list_gains(regs))
    }

    fn has_gain_mode(&self) -> bool {
        dispatch!(self, m => m.has_gain_mode())
    }

    fn set_gain_mode(&mut self, regs: &mut HardwareRegisters, automatic: bool) -> bool {
        dispatch!(self, m => m.set_gain_mode(regs, automatic))
    }

    fn gain_mode(&self, regs: &HardwareRegisters) -> bool {
        dispatch!(self, m => m.gain_mode(regs))
    }

    fn has_generic_gain(&self) -> bool {
        dispatch!(self, m => m.has_generic_gain())
    }

    fn set_gain(&mut self, regs: &mut HardwareRegisters, value: f64) -> Result<bool, GainError> {
        dispatch!(self, m => m.set_gain(regs, value))
    }

    fn set_named_gain(
        &mut self,
        regs: &mut HardwareRegisters,
        name: &str,
        value: f64,
    ) -> Result<bool, GainError> {
        dispatch!(self, m => m.set_named_gain(regs, name, value))
    }

    fn gain(&self, regs: &HardwareRegisters) -> Result<f64, GainError> {
        dispatch!(self, m => m.gain(regs))
    }

    fn named_gain(&self, regs: &HardwareRegisters, name: &str) -> Result<f64, GainError> {
        dispatch!(self, m => m.named_gain(regs, name))
    }

    fn gain_range(&self, regs: &HardwareRegisters) -> Result<GainRange, GainError> {
        dispatch!(self, m => m.gain_range(regs))
    }

    fn named_gain_range(
        &self,
        regs: &HardwareRegisters,
        name: &str,
    ) -> Result<GainRange, GainError> {
        dispatch!(self, m => m.named_gain_range(regs, name))
    }

    fn rf_gain_setting_name(&self) -> &'static str {
        dispatch!(self, m => m.rf_gain_setting_name())
    }

    fn rf_gain_setting_options(
        &self,
        regs: &HardwareRegisters,
    ) -> Result<RfGainOptions, GainError> {
        dispatch!(self, m => m.rf_gain_setting_options(regs))
    }

    fn read_rf_gain_setting(&self, regs: &HardwareRegisters) -> Result<i32, GainError> {
        dispatch!(self, m => m.read_rf_gain_setting(regs))
    }

    fn write_rf_gain_setting(
        &mut self,
        regs: &mut HardwareRegisters,
        value: i32,
    ) -> Result<bool, GainError> {
        dispatch!(self, m => m.write_rf_gain_setting(regs, value))
    }
}

// ---------------------------------------------------------------------------
// Helpers shared by the modes
// ---------------------------------------------------------------------------

/// IF gain reduction register range
pub(crate) fn if_gain_reduction_range() -> GainRange {
    GainRange::stepped(f64::from(NORMAL_MIN_GR), f64::from(MAX_BB_GR), 1.0)
}

/// Map the client AGC toggle onto `on_variant` or `Disabled`
pub(crate) fn write_agc(
    regs: &mut HardwareRegisters,
    automatic: bool,
    on_variant: AgcControl,
) -> bool {
    let agc = if automatic {
        on_variant
    } else {
        AgcControl::Disabled
    };
    regs.set_agc(agc)
}

/// Write the IF gain reduction unless AGC owns it.
///
/// An AGC-owned register is left alone with a warning; the call then
/// reports no change.
pub(crate) fn write_if_gain_reduction(regs: &mut HardwareRegisters, gr_db: i32, name: &str) -> bool {
    if regs.agc.is_enabled() {
        warn!("Not updating {} gain because AGC is enabled", name);
        return false;
    }
    regs.set_if_gain_reduction(gr_db)
}

/// Sorted option list without duplicates
pub(crate) fn sorted_options(values: impl IntoIterator<Item = i32>) -> Vec<i32> {
    let mut options: Vec<i32> = values.into_iter().collect();
    options.sort_unstable();
    options.dedup();
    options
}

/// Choose the LNA state and IF gain for a combined gain request.
///
/// `rf_gains[i]` is the RF gain of LNA state `i`. The request is split
/// between RF and IF in proportion to their spans, giving a target RF
/// gain. Among the states whose IF remainder stays inside `if_range`,
/// the one closest to the target wins (lowest state on ties), so the
/// remainder never has to be clamped. If no state qualifies the closest
/// state overall is used and the remainder is clamped.
pub(crate) fn split_combined_gain(
    value: f64,
    rf_range: GainRange,
    if_range: GainRange,
    rf_gains: &[f64],
) -> Option<(u8, f64)> {
    let min_gain = rf_range.min + if_range.min;
    let max_gain = rf_range.max + if_range.max;
    let span = max_gain - min_gain;
    let normalized = if span > 0.0 {
        (value - min_gain) / span
    } else {
        0.0
    };
    let rf_target = rf_range.min + normalized * (rf_range.max - rf_range.min);

    let closest = |accept: &dyn Fn(f64) -> bool| {
        let mut best: Option<(usize, f64)> = None;
        for (idx, &gain) in rf_gains.iter().enumerate() {
            if !accept(gain) {
                continue;
            }
            let diff = (gain - rf_target).abs();
            if best.map_or(true, |(_, best_diff)| diff < best_diff) {
                best = Some((idx, diff));
            }
        }
        best.map(|(idx, _)| idx)
    };

    let idx = closest(&|gain: f64| if_range.contains(value - gain))
        .or_else(|| closest(&|_: f64| true))?;
    let rf_gain = rf_gains[idx];
    let if_gain = (value - rf_gain).clamp(if_range.min, if_range.max);
    Some((idx as u8, if_gain))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_range_check() {
        let range = GainRange::new(20.0, 59.0);
        assert!(range.check("IF", 20.0).is_ok());
        assert!(range.check("IF", 59.0).is_ok());
        assert_eq!(
            range.check("IF", 60.0),
            Err(GainError::OutOfRange {
                name: "IF".to_string(),
                value: 60.0,
                min: 20.0,
                max: 59.0
            })
        );
        assert!(range.check("IF", f64::NAN).is_err());
    }

    #[test]
    fn test_mode_kind_names_round_trip() {
        for kind in GainModeKind::all() {
            assert_eq!(kind.name().parse::<GainModeKind>(), Ok(*kind));
            assert!(!kind.description().is_empty());
        }
        assert_eq!("DB".parse::<GainModeKind>(), Ok(GainModeKind::Db));
        assert!(matches!(
            "auto".parse::<GainModeKind>(),
            Err(GainError::UnknownGainMode(_))
        ));
    }

    #[test]
    fn test_default_kind_is_db() {
        assert_eq!(GainModeKind::default(), GainModeKind::Db);
    }

    #[test]
    fn test_new_reports_kind() {
        for kind in GainModeKind::all() {
            let mut regs = HardwareRegisters::default();
            let mode =
                GainMode::new(*kind, HardwareModel::Rsp1A, &mut regs, DbOffsets::default())
                    .unwrap();
            assert_eq!(mode.kind(), *kind);
        }
    }

    #[test]
    fn test_middle_default() {
        let options = RfGainOptions::middle_default(vec![0, 5, 10, 15, 20]);
        assert_eq!(options.default, 10);
        assert_eq!(RfGainOptions::middle_default(vec![]).default, 0);
    }

    #[test]
    fn test_sorted_options() {
        assert_eq!(sorted_options([0, 5, 21, 15, 15, 34]), vec![0, 5, 15, 21, 34]);
    }

    #[test]
    fn test_split_keeps_remainder_in_if_range() {
        // RSP1A 420 MHz - 1 GHz row as RF gains (64 - row)
        let row = [0, 7, 13, 19, 20, 27, 33, 39, 45, 64];
        let gains: Vec<f64> = row.iter().map(|&gr| f64::from(64 - gr)).collect();
        let rf_range = GainRange::new(0.0, 64.0);
        let if_range = GainRange::new(20.0, 59.0);

        let value = 35.29;
        let (lna, if_gain) = split_combined_gain(value, rf_range, if_range, &gains).unwrap();
        let achieved = gains[usize::from(lna)] + if_gain;
        assert!((achieved - value).abs() < 1e-9);
        assert!(if_range.contains(if_gain));
    }

    #[test]
    fn test_split_degenerate_rows() {
        let if_range = GainRange::new(20.0, 59.0);
        assert_eq!(split_combined_gain(30.0, GainRange::empty(), if_range, &[]), None);
        let (lna, if_gain) =
            split_combined_gain(10.0, GainRange::empty(), if_range, &[0.0]).unwrap();
        assert_eq!(lna, 0);
        assert_eq!(if_gain, 20.0);
    }
}
