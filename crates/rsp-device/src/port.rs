//! Hardware port abstraction
//!
//! The device stages register values while idle and pushes them through a
//! [`HardwarePort`] while streaming. Gain reduction pushes are acknowledged
//! asynchronously by the stream callback through a shared [`GainAck`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rsp_gain::HardwareRegisters;

use crate::error::DeviceError;

/// Which part of the register block a push updates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateReason {
    /// LNA state and IF gain reduction
    GainReduction,
    /// AGC enable and set point
    Agc,
    /// Tuned frequency, antenna port or HDR mode
    Frequency,
}

impl UpdateReason {
    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::GainReduction => "gain reduction",
            Self::Agc => "AGC",
            Self::Frequency => "frequency",
        }
    }
}

impl std::fmt::Display for UpdateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Gain change acknowledgement flag shared with the stream callback
#[derive(Debug, Clone, Default)]
pub struct GainAck(Arc<AtomicBool>);

impl GainAck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any earlier acknowledgement
    pub fn clear(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    /// Report that the hardware applied a gain change
    pub fn notify(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Connection to the receiver hardware
pub trait HardwarePort: Send {
    /// Register the acknowledgement flag the stream callback should set
    fn attach(&mut self, _ack: GainAck) {}

    /// Start streaming with the staged registers
    fn start_stream(&mut self, _regs: &HardwareRegisters) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Stop streaming
    fn stop_stream(&mut self) -> Result<(), DeviceError> {
        Ok(())
    }

    /// Push part of the register block to the running hardware
    fn apply(&mut self, regs: &HardwareRegisters, reason: UpdateReason) -> Result<(), DeviceError>;
}

impl<P: HardwarePort + ?Sized> HardwarePort for Box<P> {
    fn attach(&mut self, ack: GainAck) {
        (**self).attach(ack)
    }

    fn start_stream(&mut self, regs: &HardwareRegisters) -> Result<(), DeviceError> {
        (**self).start_stream(regs)
    }

    fn stop_stream(&mut self) -> Result<(), DeviceError> {
        (**self).stop_stream()
    }

    fn apply(&mut self, regs: &HardwareRegisters, reason: UpdateReason) -> Result<(), DeviceError> {
        (**self).apply(regs, reason)
    }
}
