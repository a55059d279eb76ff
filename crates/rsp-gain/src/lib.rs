//! RSP Gain Control Library
//!
//! This crate maps the two gain knobs of the SDRplay RSP receivers onto
//! the gain vocabularies that SDR client software expects:
//!
//! - **LNA state**: a discrete index into a per-model, per-band table of
//!   RF gain reductions
//! - **IF gain reduction**: the baseband attenuator, 20-59 dB, owned by
//!   the AGC while it is enabled
//!
//! # Architecture
//!
//! - [`table`] selects the gain reduction row for a model, frequency,
//!   antenna port and HDR flag
//! - [`search`] resolves a reduction in dB to an LNA state
//! - [`steps`] holds the combined step calibration tables
//! - [`mode`] implements each gain mode over a borrowed
//!   [`HardwareRegisters`] block
//!
//! Nothing here locks or talks to hardware. Every mutating call reports
//! whether a register changed so the enclosing driver can push the
//! update.
//!
//! # Example
//!
//! ```rust
//! use rsp_gain::{GainControl, GainMode, GainModeKind, DbOffsets, HardwareModel, HardwareRegisters};
//!
//! let mut regs = HardwareRegisters::tuned_to(100e6);
//! let mut mode = GainMode::new(GainModeKind::Db, HardwareModel::Rsp1A, &mut regs, DbOffsets::default())?;
//!
//! // 62 - 50 = 12 dB of reduction is LNA state 2 in the VHF row
//! assert!(mode.set_named_gain(&mut regs, "RF", 50.0)?);
//! assert_eq!(regs.lna_state, 2);
//! assert_eq!(mode.named_gain(&regs, "RF")?, 50.0);
//! # Ok::<(), rsp_gain::GainError>(())
//! ```

pub mod error;
pub mod mode;
pub mod model;
pub mod registers;
pub mod search;
pub mod steps;
pub mod table;

pub use error::GainError;
pub use mode::{
    DbGain, DbOffsets, GainControl, GainMode, GainModeKind, GainRange, IfGrGain, LegacyGain,
    NormalizedGain, OffsetDbGain, RfAttGain, RfGainOptions, StepsGain,
};
pub use model::{HardwareModel, ModelInfo};
pub use registers::{AgcControl, AntennaPort, HardwareRegisters, MAX_BB_GR, NORMAL_MIN_GR};
pub use search::{gr_to_lna_state, MatchMode};
pub use steps::{step_table, StepBand, StepTable, StepValues, DEFAULT_STEP, GAIN_STEPS};
pub use table::{GainReductionRow, GainReductionTable, RowSelector, MAX_TABLE_HZ};
