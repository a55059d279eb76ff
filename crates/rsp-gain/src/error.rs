//! Error types for gain table lookups and gain mode operations

use thiserror::Error;

use crate::model::HardwareModel;

/// Errors that can occur while resolving or applying a gain setting
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GainError {
    /// Hardware id reported by the vendor API is not a known RSP model
    #[error("unknown RSP model id {0}")]
    UnsupportedHardwareModel(u8),

    /// Model name could not be parsed
    #[error("unknown RSP model name: {0}")]
    UnknownModelName(String),

    /// Gain mode name could not be parsed
    #[error("unknown gain mode: {0}")]
    UnknownGainMode(String),

    /// No gain reduction table covers the tuned frequency
    #[error("no gain reduction table for {model} at {rf_hz} Hz")]
    FrequencyOutOfRange { model: HardwareModel, rf_hz: f64 },

    /// Gain element name is not offered by the active gain mode
    #[error("unknown gain element: {0}")]
    UnknownGain(String),

    /// Gain element exists but cannot be used in the current AGC state
    #[error("gain element {0} is unavailable while AGC is enabled")]
    GainUnavailable(String),

    /// Requested value lies outside the advertised range
    #[error("gain {name}={value} is out of range [{min}, {max}]")]
    OutOfRange {
        name: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// Exact-match resolution found no table entry equal to the request
    #[error("{name}={value} does not match any LNA state")]
    NoExactMatch { name: String, value: f64 },

    /// LNA state register does not index the current gain reduction row
    #[error("LNA state {state} is beyond the current table (max {max})")]
    InvalidLnaState { state: u8, max: usize },

    /// Operation has no meaning in the active gain mode
    #[error("{0} is not supported in this gain mode")]
    NotSupported(&'static str),
}
