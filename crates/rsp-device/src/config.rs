//! Device configuration
//!
//! The gain mode, hardware model and initial tuner state of a device are
//! fixed when it is opened. Configuration is plain JSON:
//!
//! ```json
//! { "model": "RSP1A", "gain_mode": "db", "rf_hz": 100000000.0 }
//! ```
//!
//! Every field is optional.

use std::path::Path;

use rsp_gain::{AntennaPort, DbOffsets, GainModeKind, HardwareModel};
use serde::{Deserialize, Serialize};

use crate::error::DeviceError;

/// Default number of 1 ms polls while waiting for a gain change acknowledgement
pub const DEFAULT_UPDATE_TIMEOUT_TICKS: u32 = 500;

/// Configuration for opening a device
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// Hardware model name ("RSP1A") or vendor API id ("255")
    pub model: String,
    /// Gain mode selected for the lifetime of the device
    pub gain_mode: GainModeKind,
    /// Polls of the gain change acknowledgement, 1 ms apart
    pub update_timeout_ticks: u32,
    /// RF offset of the offset dB gain mode
    pub rf_offset_db: i32,
    /// IF offset of the offset dB gain mode
    pub if_offset_db: i32,
    /// Initial tuned frequency in Hz
    pub rf_hz: f64,
    /// Initial antenna port
    pub antenna_port: AntennaPort,
    /// Initial RSPdx HDR mode
    pub hdr_enabled: bool,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            model: HardwareModel::Rsp1A.name().to_string(),
            gain_mode: GainModeKind::default(),
            update_timeout_ticks: DEFAULT_UPDATE_TIMEOUT_TICKS,
            rf_offset_db: 0,
            if_offset_db: 0,
            rf_hz: 200_000_000.0,
            antenna_port: AntennaPort::Standard,
            hdr_enabled: false,
        }
    }
}

impl DeviceConfig {
    /// Default configuration for a model
    pub fn for_model(model: HardwareModel) -> Self {
        Self {
            model: model.name().to_string(),
            ..Default::default()
        }
    }

    /// Parse a configuration from JSON
    pub fn from_json_str(json: &str) -> Result<Self, DeviceError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, DeviceError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String, DeviceError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Resolve the configured model from a name or a vendor API id
    pub fn resolve_model(&self) -> Result<HardwareModel, DeviceError> {
        let model = match self.model.trim().parse::<u8>() {
            Ok(hw_ver) => HardwareModel::from_hw_ver(hw_ver)?,
            Err(_) => self.model.parse::<HardwareModel>()?,
        };
        Ok(model)
    }

    /// Offsets for the offset dB gain mode
    pub fn db_offsets(&self) -> DbOffsets {
        DbOffsets {
            rf_db: self.rf_offset_db,
            if_db: self.if_offset_db,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rsp_gain::GainError;

    #[test]
    fn test_defaults() {
        let config = DeviceConfig::default();
        assert_eq!(config.resolve_model().unwrap(), HardwareModel::Rsp1A);
        assert_eq!(config.gain_mode, GainModeKind::Db);
        assert_eq!(config.update_timeout_ticks, 500);
        assert_eq!(config.rf_hz, 200_000_000.0);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config =
            DeviceConfig::from_json_str(r#"{ "model": "RSPdx", "gain_mode": "steps" }"#).unwrap();
        assert_eq!(config.resolve_model().unwrap(), HardwareModel::RspDx);
        assert_eq!(config.gain_mode, GainModeKind::Steps);
        assert_eq!(config.update_timeout_ticks, DEFAULT_UPDATE_TIMEOUT_TICKS);
        assert!(!config.hdr_enabled);
    }

    #[test]
    fn test_model_by_hw_ver() {
        let config = DeviceConfig {
            model: "255".to_string(),
            ..Default::default()
        };
        assert_eq!(config.resolve_model().unwrap(), HardwareModel::Rsp1A);

        let unknown = DeviceConfig {
            model: "9".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            unknown.resolve_model(),
            Err(DeviceError::Gain(GainError::UnsupportedHardwareModel(9)))
        ));
    }

    #[test]
    fn test_unknown_model_name() {
        let config = DeviceConfig {
            model: "RSP3".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            config.resolve_model(),
            Err(DeviceError::Gain(GainError::UnknownModelName(_)))
        ));
    }

    #[test]
    fn test_json_round_trip() {
        let config = DeviceConfig {
            gain_mode: GainModeKind::OffsetDb,
            rf_offset_db: 62,
            antenna_port: AntennaPort::HighZ,
            ..DeviceConfig::for_model(HardwareModel::Rsp2)
        };
        let json = config.to_json_string().unwrap();
        assert!(json.contains("\"offsetdb\""));
        assert_eq!(DeviceConfig::from_json_str(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            DeviceConfig::from_json_str("{ not json"),
            Err(DeviceError::Config(_))
        ));
    }
}
