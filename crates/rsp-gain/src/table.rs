//! LNA state gain reduction tables
//!
//! Each RSP model maps an LNA state to an RF gain reduction in dB.
//! The mapping depends on the tuned band and, for some models, on the
//! antenna port or the HDR mode. Bands are half-open `[a, b)` except the
//! top band, which includes 2 GHz. Frequencies above the top band have
//! no table.

use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::{AntennaPort, HardwareRegisters};

/// Upper edge of the highest modelled band (inclusive)
pub const MAX_TABLE_HZ: f64 = 2_000e6;

// RSP1
const RSP1_LOW: &[u8] = &[0, 24, 19, 43];
const RSP1_MID: &[u8] = &[0, 7, 19, 26];
const RSP1_HIGH: &[u8] = &[0, 5, 19, 24];

// RSP1A, and RSPduo on its 50 ohm ports
const RSP1A_AM: &[u8] = &[0, 6, 12, 18, 37, 42, 61];
const RSP1A_VHF: &[u8] = &[0, 6, 12, 18, 20, 26, 32, 38, 57, 62];
const RSP1A_UHF: &[u8] = &[0, 7, 13, 19, 20, 27, 33, 39, 45, 64];
const RSP1A_L: &[u8] = &[0, 6, 12, 20, 26, 32, 38, 43, 62];

// RSP2
const RSP2_VHF: &[u8] = &[0, 10, 15, 21, 24, 34, 39, 45, 64];
const RSP2_UHF: &[u8] = &[0, 7, 10, 17, 22, 41];
// Not monotonic and 15 appears twice; kept as published.
const RSP2_L: &[u8] = &[0, 5, 21, 15, 15, 34];

// Hi-Z port of the RSP2 and RSPduo
const HI_Z: &[u8] = &[0, 6, 12, 18, 37];

// RSPdx
const RSPDX_HDR: &[u8] = &[
    0, 3, 6, 9, 12, 15, 18, 21, 24, 25, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60,
];
const RSPDX_LF: &[u8] = &[
    0, 3, 6, 9, 12, 15, 24, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60,
];
const RSPDX_HF: &[u8] = &[
    0, 3, 6, 9, 12, 15, 18, 24, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60,
];
const RSPDX_VHF: &[u8] = &[
    0, 3, 6, 9, 12, 15, 24, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60, 63, 66, 69, 72, 75,
    78, 81, 84,
];
const RSPDX_BAND3: &[u8] = &[
    0, 3, 6, 9, 12, 15, 18, 24, 27, 30, 33, 36, 39, 42, 45, 48, 51, 54, 57, 60, 63, 66, 69, 72,
    75, 78, 81, 84,
];
const RSPDX_UHF: &[u8] = &[
    0, 7, 10, 13, 16, 19, 22, 25, 31, 34, 37, 40, 43, 46, 49, 52, 55, 58, 61, 64, 67,
];
const RSPDX_L: &[u8] = &[
    0, 5, 8, 11, 14, 17, 20, 32, 35, 38, 41, 44, 47, 50, 53, 56, 59, 62, 65,
];

/// Inputs that select a gain reduction row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowSelector {
    /// Tuned RF frequency in Hz
    pub rf_hz: f64,
    /// Antenna port in use
    pub antenna_port: AntennaPort,
    /// RSPdx HDR mode
    pub hdr_enabled: bool,
}

impl RowSelector {
    /// Selector for the given frequency on a standard port with HDR off
    pub fn at(rf_hz: f64) -> Self {
        Self {
            rf_hz,
            antenna_port: AntennaPort::Standard,
            hdr_enabled: false,
        }
    }
}

impl From<&HardwareRegisters> for RowSelector {
    fn from(regs: &HardwareRegisters) -> Self {
        Self {
            rf_hz: regs.rf_hz,
            antenna_port: regs.antenna_port,
            hdr_enabled: regs.hdr_enabled,
        }
    }
}

/// Per-model gain reduction table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainReductionTable {
    model: HardwareModel,
}

impl GainReductionTable {
    /// Create the table for a model
    pub fn new(model: HardwareModel) -> Self {
        Self { model }
    }

    /// Model this table describes
    pub fn model(&self) -> HardwareModel {
        self.model
    }

    /// Gain reduction row for the current tuner state of `regs`
    pub fn row(&self, regs: &HardwareRegisters) -> Result<GainReductionRow, GainError> {
        self.row_for(RowSelector::from(regs))
    }

    /// Gain reduction row for an explicit tuner state
    pub fn row_for(&self, sel: RowSelector) -> Result<GainReductionRow, GainError> {
        let hz = sel.rf_hz;
        let hi_z = sel.antenna_port == AntennaPort::HighZ;

        let values = match self.model {
            HardwareModel::Rsp1 => {
                if hz < 420e6 {
                    Some(RSP1_LOW)
                } else if hz < 1000e6 {
                    Some(RSP1_MID)
                } else if hz <= MAX_TABLE_HZ {
                    Some(RSP1_HIGH)
                } else {
                    None
                }
            }
            HardwareModel::Rsp1A => {
                if hz < 60e6 {
                    Some(RSP1A_AM)
                } else if hz < 420e6 {
                    Some(RSP1A_VHF)
                } else if hz < 1000e6 {
                    Some(RSP1A_UHF)
                } else if hz <= MAX_TABLE_HZ {
                    Some(RSP1A_L)
                } else {
                    None
                }
            }
            HardwareModel::Rsp2 => {
                if hz < 420e6 && hi_z {
                    Some(HI_Z)
                } else if hz < 420e6 {
                    Some(RSP2_VHF)
                } else if hz < 1000e6 {
                    Some(RSP2_UHF)
                } else if hz <= MAX_TABLE_HZ {
                    Some(RSP2_L)
                } else {
                    None
                }
            }
            HardwareModel::RspDuo => {
                if hz < 60e6 && hi_z {
                    Some(HI_Z)
                } else if hz < 60e6 {
                    Some(RSP1A_AM)
                } else if hz < 420e6 {
                    Some(RSP1A_VHF)
                } else if hz < 1000e6 {
                    Some(RSP1A_UHF)
                } else if hz <= MAX_TABLE_HZ {
                    Some(RSP1A_L)
                } else {
                    None
                }
            }
            HardwareModel::RspDx => {
                if hz < 2e6 && sel.hdr_enabled {
                    Some(RSPDX_HDR)
                } else if hz < 12e6 {
                    Some(RSPDX_LF)
                } else if hz < 60e6 {
                    Some(RSPDX_HF)
                } else if hz < 250e6 {
                    Some(RSPDX_VHF)
                } else if hz < 420e6 {
                    Some(RSPDX_BAND3)
                } else if hz < 1000e6 {
                    Some(RSPDX_UHF)
                } else if hz <= MAX_TABLE_HZ {
                    Some(RSPDX_L)
                } else {
                    None
                }
            }
        };

        values
            .map(GainReductionRow)
            .ok_or(GainError::FrequencyOutOfRange {
                model: self.model,
                rf_hz: hz,
            })
    }
}

/// RF gain reduction in dB for each LNA state of one band
///
/// Never empty: out-of-band lookups fail before a row is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GainReductionRow(&'static [u8]);

impl GainReductionRow {
    /// Reductions indexed by LNA state
    pub fn values(&self) -> &'static [u8] {
        self.0
    }

    /// Number of LNA states in this band
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Highest LNA state index in this band
    pub fn max_lna_state(&self) -> u8 {
        (self.0.len() - 1) as u8
    }

    /// Reduction of LNA state 0
    pub fn first(&self) -> i32 {
        i32::from(self.0[0])
    }

    /// Reduction of the last LNA state, the largest in the row
    pub fn max_reduction(&self) -> i32 {
        i32::from(self.0[self.0.len() - 1])
    }

    /// Reduction for an LNA state
    pub fn reduction(&self, lna_state: u8) -> Result<i32, GainError> {
        self.0
            .get(usize::from(lna_state))
            .map(|&gr| i32::from(gr))
            .ok_or(GainError::InvalidLnaState {
                state: lna_state,
                max: self.0.len() - 1,
            })
    }

    /// Whether reductions never decrease with the LNA state
    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0] <= pair[1])
    }
}
