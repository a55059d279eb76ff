//! RSP device
//!
//! [`RspDevice`] owns the register block and the active gain mode behind
//! one device-wide lock. Gain calls are forwarded to the gain mode; when a
//! call changes a register while the device is streaming, the change is
//! pushed through the [`HardwarePort`] and, for gain reduction changes,
//! the device waits a bounded number of 1 ms ticks for the stream
//! callback to acknowledge it.
//!
//! Failures inside the gain mode are logged and reported to the caller as
//! "no change" (or a zero value for reads). Only opening the device can
//! fail outright.

use std::thread;
use std::time::Duration;

use parking_lot::Mutex;
use rsp_gain::{
    AntennaPort, GainControl, GainError, GainMode, GainModeKind, GainRange, HardwareModel,
    HardwareRegisters, RfGainOptions,
};
use tracing::{debug, error, info, warn};

use crate::config::DeviceConfig;
use crate::error::DeviceError;
use crate::port::{GainAck, HardwarePort, UpdateReason};

/// Interval between acknowledgement polls
const ACK_POLL_INTERVAL: Duration = Duration::from_millis(1);

struct DeviceState<P> {
    regs: HardwareRegisters,
    mode: GainMode,
    port: P,
    streaming: bool,
}

/// One receiver channel with its gain mode and hardware port
pub struct RspDevice<P: HardwarePort> {
    model: HardwareModel,
    update_timeout_ticks: u32,
    ack: GainAck,
    state: Mutex<DeviceState<P>>,
}

impl<P: HardwarePort> RspDevice<P> {
    /// Open a device with the given configuration.
    ///
    /// Fails if the configured model is unknown or the gain mode cannot
    /// be built for the initial tuner state.
    pub fn new(config: &DeviceConfig, mut port: P) -> Result<Self, DeviceError> {
        let model = config.resolve_model()?;
        let mut regs = HardwareRegisters {
            rf_hz: config.rf_hz,
            antenna_port: config.antenna_port,
            hdr_enabled: config.hdr_enabled,
            ..Default::default()
        };
        let mode = GainMode::new(config.gain_mode, model, &mut regs, config.db_offsets())?;

        let ack = GainAck::new();
        port.attach(ack.clone());

        info!(
            "Opened {} with {} gain mode at {}",
            model,
            mode.kind(),
            regs.frequency_display()
        );

        Ok(Self {
            model,
            update_timeout_ticks: config.update_timeout_ticks,
            ack,
            state: Mutex::new(DeviceState {
                regs,
                mode,
                port,
                streaming: false,
            }),
        })
    }

    pub fn model(&self) -> HardwareModel {
        self.model
    }

    pub fn gain_mode_kind(&self) -> GainModeKind {
        self.state.lock().mode.kind()
    }

    /// Snapshot of the register block
    pub fn registers(&self) -> HardwareRegisters {
        self.state.lock().regs.clone()
    }

    /// Acknowledgement flag for the stream callback
    pub fn gain_ack(&self) -> GainAck {
        self.ack.clone()
    }

    /// Called by the stream callback when the hardware reports a gain change
    pub fn notify_gain_changed(&self) {
        self.ack.notify();
    }

    // ========================================================================
    // Streaming
    // ========================================================================

    /// Start streaming; staged registers are handed to the port
    pub fn activate_stream(&self) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if state.streaming {
            return Ok(());
        }
        let DeviceState { regs, port, .. } = &mut *state;
        port.start_stream(regs)?;
        state.streaming = true;
        info!("Stream started: {}", state.regs.gain_summary());
        Ok(())
    }

    pub fn deactivate_stream(&self) -> Result<(), DeviceError> {
        let mut state = self.state.lock();
        if !state.streaming {
            return Ok(());
        }
        state.port.stop_stream()?;
        state.streaming = false;
        info!("Stream stopped");
        Ok(())
    }

    pub fn is_streaming(&self) -> bool {
        self.state.lock().streaming
    }

    // ========================================================================
    // Gain
    // ========================================================================

    pub fn list_gains(&self) -> Vec<&'static str> {
        let state = self.state.lock();
        state.mode.list_gains(&state.regs)
    }

    pub fn has_gain_mode(&self) -> bool {
        self.state.lock().mode.has_gain_mode()
    }

    /// Enable or disable AGC, returning whether the AGC register changed
    pub fn set_gain_mode(&self, automatic: bool) -> bool {
        self.mutate("set gain mode", |mode, regs| {
            Ok(mode.set_gain_mode(regs, automatic))
        })
    }

    pub fn gain_mode(&self) -> bool {
        let state = self.state.lock();
        state.mode.gain_mode(&state.regs)
    }

    pub fn has_generic_gain(&self) -> bool {
        self.state.lock().mode.has_generic_gain()
    }

    /// Set the combined gain, returning whether a register changed
    pub fn set_gain(&self, value: f64) -> bool {
        self.mutate("set gain", |mode, regs| mode.set_gain(regs, value))
    }

    /// Set a named gain element, returning whether a register changed
    pub fn set_named_gain(&self, name: &str, value: f64) -> bool {
        self.mutate("set gain", |mode, regs| {
            mode.set_named_gain(regs, name, value)
        })
    }

    /// Combined gain, 0 when the mode has none
    pub fn gain(&self) -> f64 {
        self.read("get gain", 0.0, |mode, regs| mode.gain(regs))
    }

    pub fn named_gain(&self, name: &str) -> f64 {
        self.read("get gain", 0.0, |mode, regs| mode.named_gain(regs, name))
    }

    pub fn gain_range(&self) -> GainRange {
        self.read("get gain range", GainRange::empty(), |mode, regs| {
            mode.gain_range(regs)
        })
    }

    pub fn named_gain_range(&self, name: &str) -> GainRange {
        self.read("get gain range", GainRange::empty(), |mode, regs| {
            mode.named_gain_range(regs, name)
        })
    }

    // ========================================================================
    // RF gain setting
    // ========================================================================

    pub fn rf_gain_setting_name(&self) -> &'static str {
        self.state.lock().mode.rf_gain_setting_name()
    }

    pub fn rf_gain_setting_options(&self) -> RfGainOptions {
        let empty = RfGainOptions {
            values: Vec::new(),
            default: 0,
        };
        self.read("get RF gain options", empty, |mode, regs| {
            mode.rf_gain_setting_options(regs)
        })
    }

    pub fn read_rf_gain_setting(&self) -> i32 {
        self.read("read RF gain setting", 0, |mode, regs| {
            mode.read_rf_gain_setting(regs)
        })
    }

    pub fn write_rf_gain_setting(&self, value: i32) -> bool {
        self.mutate("write RF gain setting", |mode, regs| {
            mode.write_rf_gain_setting(regs, value)
        })
    }

    // ========================================================================
    // Tuner
    // ========================================================================

    /// Retune; later gain calls use the row for the new frequency
    pub fn set_frequency(&self, rf_hz: f64) -> bool {
        if !rf_hz.is_finite() || rf_hz <= 0.0 {
            error!("Invalid RF frequency {} Hz", rf_hz);
            return false;
        }
        self.retune(|regs| {
            if regs.rf_hz != rf_hz {
                regs.rf_hz = rf_hz;
                true
            } else {
                false
            }
        })
    }

    pub fn set_antenna_port(&self, antenna_port: AntennaPort) -> bool {
        self.retune(|regs| {
            if regs.antenna_port != antenna_port {
                regs.antenna_port = antenna_port;
                true
            } else {
                false
            }
        })
    }

    /// Enable or disable HDR mode (RSPdx only)
    pub fn set_hdr_enabled(&self, enabled: bool) -> bool {
        if enabled && self.model != HardwareModel::RspDx {
            warn!("HDR mode is only available on the RSPdx");
            return false;
        }
        self.retune(|regs| {
            if regs.hdr_enabled != enabled {
                regs.hdr_enabled = enabled;
                true
            } else {
                false
            }
        })
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// Run a mutating gain call, pushing any change while streaming
    pub(crate) fn apply_change<F>(&self, f: F) -> Result<bool, GainError>
    where
        F: FnOnce(&mut GainMode, &mut HardwareRegisters) -> Result<bool, GainError>,
    {
        let mut state = self.state.lock();
        let before = state.regs.clone();
        let changed = {
            let DeviceState { regs, mode, .. } = &mut *state;
            f(mode, regs)?
        };
        if changed && state.streaming {
            self.push_changes(&mut state, &before);
        }
        Ok(changed)
    }

    /// Run a read-only call under the device lock
    pub(crate) fn read_with<T>(&self, f: impl FnOnce(&GainMode, &HardwareRegisters) -> T) -> T {
        let state = self.state.lock();
        f(&state.mode, &state.regs)
    }

    fn mutate<F>(&self, what: &str, f: F) -> bool
    where
        F: FnOnce(&mut GainMode, &mut HardwareRegisters) -> Result<bool, GainError>,
    {
        match self.apply_change(f) {
            Ok(changed) => changed,
            Err(e) => {
                error!("{}: {}", what, e);
                false
            }
        }
    }

    fn read<T, F>(&self, what: &str, fallback: T, f: F) -> T
    where
        F: FnOnce(&GainMode, &HardwareRegisters) -> Result<T, GainError>,
    {
        match self.read_with(f) {
            Ok(value) => value,
            Err(GainError::NotSupported(op)) => {
                debug!("{}: {} not supported by this gain mode", what, op);
                fallback
            }
            Err(e) => {
                error!("{}: {}", what, e);
                fallback
            }
        }
    }

    fn retune(&self, f: impl FnOnce(&mut HardwareRegisters) -> bool) -> bool {
        let mut state = self.state.lock();
        if !f(&mut state.regs) {
            return false;
        }
        debug!("Retuned: {}", state.regs.gain_summary());
        if state.streaming {
            Self::push(&mut state, UpdateReason::Frequency);
        }
        true
    }

    fn push_changes(&self, state: &mut DeviceState<P>, before: &HardwareRegisters) {
        let regs = &state.regs;
        let agc_changed =
            regs.agc != before.agc || regs.agc_set_point_dbfs != before.agc_set_point_dbfs;
        let gr_changed = regs.lna_state != before.lna_state
            || regs.if_gain_reduction_db != before.if_gain_reduction_db;

        if agc_changed {
            Self::push(state, UpdateReason::Agc);
        }
        if gr_changed {
            self.ack.clear();
            if Self::push(state, UpdateReason::GainReduction) {
                self.wait_for_ack();
            }
        }
    }

    fn push(state: &mut DeviceState<P>, reason: UpdateReason) -> bool {
        let DeviceState { regs, port, .. } = state;
        match port.apply(regs, reason) {
            Ok(()) => {
                debug!("Pushed {} update: {}", reason, regs.gain_summary());
                true
            }
            Err(e) => {
                error!("{} update failed: {}", reason, e);
                false
            }
        }
    }

    fn wait_for_ack(&self) -> bool {
        for _ in 0..self.update_timeout_ticks {
            if self.ack.is_set() {
                return true;
            }
            thread::sleep(ACK_POLL_INTERVAL);
        }
        if self.ack.is_set() {
            return true;
        }
        warn!(
            "Gain change not acknowledged after {} ms",
            self.update_timeout_ticks
        );
        false
    }
}

impl<P: HardwarePort> std::fmt::Debug for RspDevice<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RspDevice")
            .field("model", &self.model)
            .field("mode", &state.mode.kind())
            .field("regs", &state.regs)
            .field("streaming", &state.streaming)
            .finish()
    }
}
