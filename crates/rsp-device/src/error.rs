//! Error types for the device layer

use rsp_gain::GainError;
use thiserror::Error;

/// Errors that can occur while opening or driving a device
#[derive(Debug, Error)]
pub enum DeviceError {
    /// Gain table or gain mode error
    #[error("gain error: {0}")]
    Gain(#[from] GainError),

    /// Configuration could not be parsed
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Setting key is not known
    #[error("unknown setting: {0}")]
    UnknownSetting(String),

    /// Setting value could not be parsed or is out of range
    #[error("invalid value {value:?} for setting {key}")]
    InvalidSettingValue { key: String, value: String },

    /// Hardware rejected an update
    #[error("hardware error: {0}")]
    Hardware(String),
}
