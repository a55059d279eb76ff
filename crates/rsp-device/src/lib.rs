//! RSP Device Layer
//!
//! This crate wraps the gain core of [`rsp_gain`] in a device: one
//! register block and one gain mode per receiver channel, serialized by
//! a device-wide lock.
//!
//! - While idle, gain calls only stage register values
//! - While streaming, every change is pushed through a [`HardwarePort`]
//!   and gain reduction changes wait (bounded) for the hardware to
//!   acknowledge them
//!
//! # Example
//!
//! ```rust
//! use rsp_device::{DeviceConfig, RspDevice, SimulatedPort, UpdateReason};
//!
//! let config = DeviceConfig::from_json_str(r#"{ "model": "RSP1A", "rf_hz": 100e6 }"#)?;
//! let port = SimulatedPort::new();
//! let device = RspDevice::new(&config, port.clone())?;
//!
//! device.activate_stream()?;
//! assert!(device.set_named_gain("RF", 50.0));
//! assert_eq!(port.reasons(), vec![UpdateReason::GainReduction]);
//! # Ok::<(), rsp_device::DeviceError>(())
//! ```

pub mod config;
pub mod device;
pub mod error;
pub mod port;
pub mod settings;
pub mod sim;

pub use config::{DeviceConfig, DEFAULT_UPDATE_TIMEOUT_TICKS};
pub use device::RspDevice;
pub use error::DeviceError;
pub use port::{GainAck, HardwarePort, UpdateReason};
pub use settings::{SettingInfo, AGC_SET_POINT_KEY, RF_GAIN_SELECT_KEY};
pub use sim::{AckBehavior, RecordedUpdate, SimulatedPort};

// Re-export the gain core for convenience
pub use rsp_gain;
