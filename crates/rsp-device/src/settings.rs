//! Key/value device settings
//!
//! | key            | value                                    |
//! |----------------|------------------------------------------|
//! | `rfgain_sel`   | coarse RF gain setting of the gain mode  |
//! | `agc_setpoint` | AGC set point in dBFS, -60 to 0          |

use rsp_gain::GainControl;
use serde::Serialize;
use tracing::debug;

use crate::device::RspDevice;
use crate::error::DeviceError;
use crate::port::HardwarePort;

/// Key of the coarse RF gain setting
pub const RF_GAIN_SELECT_KEY: &str = "rfgain_sel";
/// Key of the AGC set point
pub const AGC_SET_POINT_KEY: &str = "agc_setpoint";

pub const AGC_SET_POINT_MIN: i32 = -60;
pub const AGC_SET_POINT_MAX: i32 = 0;
pub const AGC_SET_POINT_DEFAULT: i32 = -30;

/// Description of one setting for a client UI
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingInfo {
    pub key: &'static str,
    pub name: String,
    pub description: String,
    pub default: String,
    /// Selectable values, empty when the setting is a range
    pub options: Vec<String>,
    /// Inclusive bounds of an integer setting
    pub range: Option<(i32, i32)>,
}

fn parse_int(key: &str, value: &str) -> Result<i32, DeviceError> {
    value
        .trim()
        .parse::<i32>()
        .map_err(|_| DeviceError::InvalidSettingValue {
            key: key.to_string(),
            value: value.to_string(),
        })
}

impl<P: HardwarePort> RspDevice<P> {
    /// Settings this device exposes
    pub fn setting_info(&self) -> Vec<SettingInfo> {
        let rf_gain = self.read_with(|mode, regs| {
            let (options, default) = match mode.rf_gain_setting_options(regs) {
                Ok(options) => (options.values, options.default),
                Err(e) => {
                    debug!("No RF gain options: {}", e);
                    (Vec::new(), 0)
                }
            };
            SettingInfo {
                key: RF_GAIN_SELECT_KEY,
                name: mode.rf_gain_setting_name().to_string(),
                description: format!("RF gain setting of the {} gain mode", mode.kind()),
                default: default.to_string(),
                options: options.iter().map(i32::to_string).collect(),
                range: None,
            }
        });

        let agc_set_point = SettingInfo {
            key: AGC_SET_POINT_KEY,
            name: "AGC Setpoint".to_string(),
            description: "AGC set point in dBFS".to_string(),
            default: AGC_SET_POINT_DEFAULT.to_string(),
            options: Vec::new(),
            range: Some((AGC_SET_POINT_MIN, AGC_SET_POINT_MAX)),
        };

        vec![rf_gain, agc_set_point]
    }

    /// Read a setting as a string
    pub fn read_setting(&self, key: &str) -> Result<String, DeviceError> {
        match key {
            RF_GAIN_SELECT_KEY => {
                let value = self.read_with(|mode, regs| mode.read_rf_gain_setting(regs))?;
                Ok(value.to_string())
            }
            AGC_SET_POINT_KEY => Ok(self.registers().agc_set_point_dbfs.to_string()),
            _ => Err(DeviceError::UnknownSetting(key.to_string())),
        }
    }

    /// Write a setting, returning whether a register changed
    pub fn write_setting(&self, key: &str, value: &str) -> Result<bool, DeviceError> {
        match key {
            RF_GAIN_SELECT_KEY => {
                let setting = parse_int(key, value)?;
                Ok(self.apply_change(|mode, regs| mode.write_rf_gain_setting(regs, setting))?)
            }
            AGC_SET_POINT_KEY => {
                let set_point = parse_int(key, value)?;
                if !(AGC_SET_POINT_MIN..=AGC_SET_POINT_MAX).contains(&set_point) {
                    return Err(DeviceError::InvalidSettingValue {
                        key: key.to_string(),
                        value: value.to_string(),
                    });
                }
                Ok(self.apply_change(|_mode, regs| {
                    if regs.agc_set_point_dbfs != set_point {
                        regs.agc_set_point_dbfs = set_point;
                        Ok(true)
                    } else {
                        Ok(false)
                    }
                })?)
            }
            _ => Err(DeviceError::UnknownSetting(key.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeviceConfig;
    use crate::port::UpdateReason;
    use crate::sim::SimulatedPort;
    use rsp_gain::{GainError, GainModeKind, HardwareModel};

    fn open(gain_mode: GainModeKind) -> (RspDevice<SimulatedPort>, SimulatedPort) {
        let port = SimulatedPort::new();
        let config = DeviceConfig {
            gain_mode,
            rf_hz: 100e6,
            ..DeviceConfig::for_model(HardwareModel::Rsp1A)
        };
        (RspDevice::new(&config, port.clone()).unwrap(), port)
    }

    #[test]
    fn test_setting_info() {
        let (device, _) = open(GainModeKind::Db);
        let info = device.setting_info();
        assert_eq!(info.len(), 2);
        assert_eq!(info[0].key, RF_GAIN_SELECT_KEY);
        assert_eq!(info[0].name, "RF Gain (dB)");
        assert_eq!(info[0].default, "42");
        assert_eq!(info[0].options.first().map(String::as_str), Some("0"));
        assert_eq!(info[1].range, Some((-60, 0)));

        let json = serde_json::to_string(&info[1]).unwrap();
        assert!(json.contains("\"agc_setpoint\""));
    }

    #[test]
    fn test_rf_gain_select() {
        let (device, _) = open(GainModeKind::Legacy);
        assert_eq!(device.read_setting(RF_GAIN_SELECT_KEY).unwrap(), "0");
        assert!(device.write_setting(RF_GAIN_SELECT_KEY, "4").unwrap());
        assert_eq!(device.registers().lna_state, 4);
        assert_eq!(device.read_setting(RF_GAIN_SELECT_KEY).unwrap(), "4");
        assert!(!device.write_setting(RF_GAIN_SELECT_KEY, "4").unwrap());
    }

    #[test]
    fn test_rf_gain_select_errors() {
        let (device, _) = open(GainModeKind::Db);
        assert!(matches!(
            device.write_setting(RF_GAIN_SELECT_KEY, "loud"),
            Err(DeviceError::InvalidSettingValue { .. })
        ));
        assert!(matches!(
            device.write_setting(RF_GAIN_SELECT_KEY, "7"),
            Err(DeviceError::Gain(GainError::NoExactMatch { .. }))
        ));
    }

    #[test]
    fn test_agc_set_point() {
        let (device, port) = open(GainModeKind::Db);
        assert_eq!(device.read_setting(AGC_SET_POINT_KEY).unwrap(), "-30");
        assert!(device.write_setting(AGC_SET_POINT_KEY, "-40").unwrap());
        assert!(port.updates().is_empty());

        device.activate_stream().unwrap();
        assert!(device.write_setting(AGC_SET_POINT_KEY, " -20 ").unwrap());
        assert_eq!(port.reasons(), vec![UpdateReason::Agc]);
        assert_eq!(device.registers().agc_set_point_dbfs, -20);

        assert!(matches!(
            device.write_setting(AGC_SET_POINT_KEY, "-61"),
            Err(DeviceError::InvalidSettingValue { .. })
        ));
        assert!(matches!(
            device.write_setting(AGC_SET_POINT_KEY, "1"),
            Err(DeviceError::InvalidSettingValue { .. })
        ));
    }

    #[test]
    fn test_unknown_setting() {
        let (device, _) = open(GainModeKind::Db);
        assert!(matches!(
            device.read_setting("biasT_ctrl"),
            Err(DeviceError::UnknownSetting(_))
        ));
        assert!(matches!(
            device.write_setting("biasT_ctrl", "true"),
            Err(DeviceError::UnknownSetting(_))
        ));
    }
}
