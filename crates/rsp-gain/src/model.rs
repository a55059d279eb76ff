//! RSP hardware model database
//!
//! The receiver family differs in the number of LNA states, the
//! antenna ports that change the front-end path, and the vendor API
//! id reported when the device is opened.

use std::fmt;
use std::str::FromStr;

use crate::error::GainError;

/// Vendor API hardware id of the RSP1
pub const RSP1_ID: u8 = 1;
/// Vendor API hardware id of the RSP1A
pub const RSP1A_ID: u8 = 255;
/// Vendor API hardware id of the RSP2 / RSP2pro
pub const RSP2_ID: u8 = 2;
/// Vendor API hardware id of the RSPduo
pub const RSPDUO_ID: u8 = 3;
/// Vendor API hardware id of the RSPdx
pub const RSPDX_ID: u8 = 4;

/// A member of the RSP receiver family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum HardwareModel {
    /// Original RSP1 (4 LNA states)
    Rsp1,
    /// RSP1A (up to 10 LNA states)
    Rsp1A,
    /// RSP2 / RSP2pro, with a Hi-Z port below 420 MHz
    Rsp2,
    /// Dual tuner RSPduo, with a Hi-Z port on tuner 1 below 60 MHz
    RspDuo,
    /// RSPdx, with an HDR mode below 2 MHz
    RspDx,
}

/// Static description of a hardware model
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelInfo {
    /// Hardware key as reported to clients
    pub name: &'static str,
    /// Vendor API hardware id
    pub hw_ver: u8,
    /// Highest LNA state index over all bands
    pub max_lna_state: u8,
    /// Default entry of the raw LNA state option list
    pub rf_gain_select_default: u8,
    /// Has a Hi-Z antenna port with its own gain table
    pub has_hi_z_port: bool,
    /// Has an HDR mode with its own gain table
    pub has_hdr_mode: bool,
}

const RSP1_INFO: ModelInfo = ModelInfo {
    name: "RSP1",
    hw_ver: RSP1_ID,
    max_lna_state: 3,
    rf_gain_select_default: 1,
    has_hi_z_port: false,
    has_hdr_mode: false,
};

const RSP1A_INFO: ModelInfo = ModelInfo {
    name: "RSP1A",
    hw_ver: RSP1A_ID,
    max_lna_state: 9,
    rf_gain_select_default: 4,
    has_hi_z_port: false,
    has_hdr_mode: false,
};

const RSP2_INFO: ModelInfo = ModelInfo {
    name: "RSP2",
    hw_ver: RSP2_ID,
    max_lna_state: 8,
    rf_gain_select_default: 4,
    has_hi_z_port: true,
    has_hdr_mode: false,
};

const RSPDUO_INFO: ModelInfo = ModelInfo {
    name: "RSPduo",
    hw_ver: RSPDUO_ID,
    max_lna_state: 9,
    rf_gain_select_default: 4,
    has_hi_z_port: true,
    has_hdr_mode: false,
};

const RSPDX_INFO: ModelInfo = ModelInfo {
    name: "RSPdx",
    hw_ver: RSPDX_ID,
    max_lna_state: 27,
    rf_gain_select_default: 4,
    has_hi_z_port: false,
    has_hdr_mode: true,
};

impl HardwareModel {
    /// All supported models
    pub fn all() -> &'static [HardwareModel] {
        &[
            HardwareModel::Rsp1,
            HardwareModel::Rsp1A,
            HardwareModel::Rsp2,
            HardwareModel::RspDuo,
            HardwareModel::RspDx,
        ]
    }

    /// Resolve a model from the vendor API hardware id
    pub fn from_hw_ver(hw_ver: u8) -> Result<Self, GainError> {
        Self::all()
            .iter()
            .find(|model| model.hw_ver() == hw_ver)
            .copied()
            .ok_or(GainError::UnsupportedHardwareModel(hw_ver))
    }

    /// Static information about this model
    pub fn info(&self) -> &'static ModelInfo {
        match self {
            HardwareModel::Rsp1 => &RSP1_INFO,
            HardwareModel::Rsp1A => &RSP1A_INFO,
            HardwareModel::Rsp2 => &RSP2_INFO,
            HardwareModel::RspDuo => &RSPDUO_INFO,
            HardwareModel::RspDx => &RSPDX_INFO,
        }
    }

    /// Hardware key ("RSP1", "RSP1A", ...)
    pub fn name(&self) -> &'static str {
        self.info().name
    }

    /// Vendor API hardware id
    pub fn hw_ver(&self) -> u8 {
        self.info().hw_ver
    }

    /// Highest LNA state index accepted by the raw RF gain controls
    pub fn max_lna_state(&self) -> u8 {
        self.info().max_lna_state
    }

    /// Default raw LNA state offered in "RF Gain Select" option lists
    pub fn rf_gain_select_default(&self) -> u8 {
        self.info().rf_gain_select_default
    }
}

impl fmt::Display for HardwareModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HardwareModel {
    type Err = GainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .find(|model| model.name().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| GainError::UnknownModelName(s.to_string()))
    }
}
