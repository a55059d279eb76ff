//! Combined gain step calibration tables
//!
//! Each table pairs an LNA state with an IF gain reduction for every
//! step from 1 (least gain) to [`GAIN_STEPS`] (most gain). The values
//! follow the step tables of the SDRplay RSP TCP server. Bands are the
//! six broadcast bands below, with the Hi-Z port of the RSP2 and RSPduo
//! splitting the AM band.
//!
//! | band | range |
//! |---|---|
//! | AM | < 60 MHz |
//! | VHF | < 120 MHz |
//! | III | < 250 MHz |
//! | X | < 420 MHz |
//! | IV-V | < 1 GHz |
//! | L | <= 2 GHz |

use crate::error::GainError;
use crate::model::HardwareModel;
use crate::registers::AntennaPort;
use crate::table::MAX_TABLE_HZ;

/// Number of combined gain steps
pub const GAIN_STEPS: u8 = 29;

/// Step selected when a step table is first applied
pub const DEFAULT_STEP: u8 = GAIN_STEPS / 2 + 1;

const N: usize = GAIN_STEPS as usize;

/// LNA state and IF gain reduction for each step of one band
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepTable {
    lna_states: [u8; N],
    if_gains: [u8; N],
}

/// Register values of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepValues {
    pub lna_state: u8,
    pub if_gain_reduction_db: i32,
}

impl StepTable {
    /// Register values for a step in `1..=GAIN_STEPS`
    pub fn lookup(&self, step: u8) -> Option<StepValues> {
        let idx = usize::from(step.checked_sub(1)?);
        let lna_state = *self.lna_states.get(idx)?;
        let if_gr = *self.if_gains.get(idx)?;
        Some(StepValues {
            lna_state,
            if_gain_reduction_db: i32::from(if_gr),
        })
    }

    /// LNA states, indexed by step - 1
    pub fn lna_states(&self) -> &[u8; N] {
        &self.lna_states
    }

    /// IF gain reductions, indexed by step - 1
    pub fn if_gains(&self) -> &[u8; N] {
        &self.if_gains
    }
}

const RSP1_LOW: StepTable = StepTable {
    lna_states: [3, 3, 3, 3, 3, 3, 3, 1, 1, 1, 1, 1, 1, 2, 2, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 56, 53, 50, 47, 44, 41, 58, 55, 52, 49, 46, 43, 45, 42, 58, 55, 52, 49, 46, 43, 41, 38, 35, 32, 29, 26, 23, 20],
};

const RSP1_UHF: StepTable = StepTable {
    lna_states: [3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 3, 2, 2, 2, 1, 1, 1, 1, 1, 0, 0, 0, 0],
    if_gains: [59, 57, 54, 52, 50, 47, 45, 43, 40, 38, 36, 33, 31, 29, 27, 24, 22, 27, 24, 22, 32, 29, 27, 25, 22, 27, 25, 22, 20],
};

const RSP1_L: StepTable = StepTable {
    lna_states: [3, 3, 3, 3, 3, 3, 3, 3, 3, 2, 2, 1, 1, 1, 1, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 57, 55, 52, 50, 48, 46, 43, 41, 44, 42, 53, 51, 49, 47, 44, 42, 45, 43, 40, 38, 36, 34, 31, 29, 27, 25, 22, 20],
};

// Shared by the RSP1A and the RSPduo 50 ohm ports
const RSP1A_AM: StepTable = StepTable {
    lna_states: [6, 6, 6, 6, 6, 6, 5, 5, 5, 5, 5, 4, 4, 3, 3, 3, 3, 3, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 45, 41, 57, 53, 49, 46, 42, 44, 40, 56, 52, 48, 45, 41, 44, 40, 43, 45, 41, 38, 34, 31, 27, 24, 20],
};

const RSP1A_VHF: StepTable = StepTable {
    lna_states: [9, 9, 9, 9, 9, 9, 8, 7, 7, 7, 7, 7, 6, 6, 5, 5, 4, 3, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 45, 41, 42, 58, 54, 51, 47, 43, 46, 42, 44, 41, 43, 42, 44, 40, 43, 45, 42, 38, 34, 31, 27, 24, 20],
};

const RSP1A_UHF: StepTable = StepTable {
    lna_states: [9, 9, 9, 9, 9, 9, 8, 8, 8, 8, 8, 7, 6, 6, 5, 5, 4, 4, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 44, 41, 56, 52, 49, 45, 41, 44, 46, 42, 45, 41, 44, 40, 44, 40, 42, 46, 42, 38, 35, 31, 27, 24, 20],
};

const RSP1A_L: StepTable = StepTable {
    lna_states: [8, 8, 8, 8, 8, 8, 7, 7, 7, 7, 7, 6, 5, 5, 4, 4, 3, 2, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 45, 41, 56, 53, 49, 46, 42, 43, 46, 42, 44, 41, 43, 48, 44, 40, 43, 45, 42, 38, 34, 31, 27, 24, 20],
};

// RSP2 L band, also used for the Hi-Z port of the RSP2 and RSPduo
const RSP2_L: StepTable = StepTable {
    lna_states: [4, 4, 4, 4, 4, 4, 4, 4, 3, 3, 3, 3, 3, 3, 3, 2, 2, 1, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 56, 54, 51, 48, 45, 43, 40, 56, 54, 51, 48, 45, 43, 40, 43, 41, 44, 41, 44, 42, 39, 36, 34, 31, 28, 25, 23, 20],
};

const RSP2_LOW: StepTable = StepTable {
    lna_states: [8, 8, 8, 8, 8, 8, 7, 7, 7, 7, 7, 6, 5, 5, 4, 4, 4, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 44, 41, 56, 52, 49, 45, 41, 44, 45, 41, 48, 44, 40, 45, 42, 43, 49, 46, 42, 38, 35, 31, 27, 24, 20],
};

const RSP2_UHF: StepTable = StepTable {
    lna_states: [5, 5, 5, 5, 5, 5, 5, 4, 4, 4, 4, 4, 4, 4, 3, 3, 2, 2, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 56, 53, 50, 48, 45, 42, 58, 55, 52, 49, 47, 44, 41, 43, 40, 44, 41, 42, 46, 43, 40, 37, 34, 31, 29, 26, 23, 20],
};

const RSPDX_AM: StepTable = StepTable {
    lna_states: [18, 18, 18, 18, 18, 18, 17, 16, 14, 13, 12, 11, 10, 9, 7, 6, 5, 5, 5, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 45, 41, 41, 40, 43, 42, 42, 41, 41, 40, 42, 42, 47, 44, 40, 43, 42, 42, 41, 38, 34, 31, 27, 24, 20],
};

const RSPDX_VHF: StepTable = StepTable {
    lna_states: [26, 26, 26, 26, 26, 25, 23, 22, 20, 19, 17, 16, 14, 13, 11, 10, 8, 7, 5, 5, 5, 3, 2, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 50, 46, 41, 40, 42, 40, 42, 40, 42, 41, 42, 41, 43, 41, 43, 41, 49, 45, 40, 42, 40, 42, 38, 33, 29, 24, 20],
};

const RSPDX_X: StepTable = StepTable {
    lna_states: [27, 27, 27, 27, 27, 26, 24, 23, 21, 20, 18, 17, 15, 14, 12, 11, 9, 8, 6, 6, 5, 3, 2, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 50, 46, 41, 40, 42, 40, 42, 40, 42, 41, 42, 41, 43, 41, 43, 41, 46, 42, 40, 42, 40, 42, 38, 33, 29, 24, 20],
};

const RSPDX_UHF: StepTable = StepTable {
    lna_states: [20, 20, 20, 20, 20, 20, 18, 17, 16, 14, 13, 12, 11, 9, 8, 7, 7, 5, 4, 3, 2, 0, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 51, 48, 44, 40, 42, 42, 41, 43, 42, 41, 41, 43, 42, 44, 40, 43, 42, 41, 40, 46, 43, 39, 35, 31, 28, 24, 20],
};

const RSPDX_L: StepTable = StepTable {
    lna_states: [18, 18, 18, 18, 18, 18, 16, 15, 14, 13, 11, 10, 9, 8, 7, 6, 6, 6, 5, 3, 2, 1, 0, 0, 0, 0, 0, 0, 0],
    if_gains: [59, 55, 52, 48, 44, 40, 43, 42, 41, 41, 43, 42, 41, 41, 40, 48, 45, 41, 40, 42, 42, 41, 42, 39, 35, 31, 27, 24, 20],
};

/// Broadcast band used to pick a step table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepBand {
    Am,
    Vhf,
    Band3,
    BandX,
    Band45,
    BandL,
}

impl StepBand {
    /// Band containing `rf_hz`, or `None` above 2 GHz
    pub fn from_hz(rf_hz: f64) -> Option<Self> {
        if rf_hz < 60e6 {
            Some(Self::Am)
        } else if rf_hz < 120e6 {
            Some(Self::Vhf)
        } else if rf_hz < 250e6 {
            Some(Self::Band3)
        } else if rf_hz < 420e6 {
            Some(Self::BandX)
        } else if rf_hz < 1000e6 {
            Some(Self::Band45)
        } else if rf_hz <= MAX_TABLE_HZ {
            Some(Self::BandL)
        } else {
            None
        }
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Vhf => "VHF",
            Self::Band3 => "Band III",
            Self::BandX => "Band X",
            Self::Band45 => "Band IV-V",
            Self::BandL => "L-Band",
        }
    }
}

/// Step table for a model at the given frequency and antenna port
pub fn step_table(
    model: HardwareModel,
    rf_hz: f64,
    antenna_port: AntennaPort,
) -> Result<&'static StepTable, GainError> {
    use StepBand::*;

    let band = StepBand::from_hz(rf_hz).ok_or(GainError::FrequencyOutOfRange { model, rf_hz })?;
    let hi_z = antenna_port == AntennaPort::HighZ;

    let table = match model {
        HardwareModel::Rsp1 => match band {
            Am | Vhf | Band3 | BandX => &RSP1_LOW,
            Band45 => &RSP1_UHF,
            BandL => &RSP1_L,
        },
        HardwareModel::Rsp1A => match band {
            Am => &RSP1A_AM,
            Vhf | Band3 | BandX => &RSP1A_VHF,
            Band45 => &RSP1A_UHF,
            BandL => &RSP1A_L,
        },
        HardwareModel::Rsp2 => match band {
            Am if hi_z => &RSP2_L,
            Am | Vhf | Band3 | BandX => &RSP2_LOW,
            Band45 => &RSP2_UHF,
            BandL => &RSP2_L,
        },
        HardwareModel::RspDuo => match band {
            Am if hi_z => &RSP2_L,
            Am => &RSP1A_AM,
            Vhf | Band3 | BandX => &RSP1A_VHF,
            Band45 => &RSP1A_UHF,
            BandL => &RSP1A_L,
        },
        HardwareModel::RspDx => match band {
            Am => &RSPDX_AM,
            Vhf | Band3 => &RSPDX_VHF,
            BandX => &RSPDX_X,
            Band45 => &RSPDX_UHF,
            BandL => &RSPDX_L,
        },
    };
    Ok(table)
}
