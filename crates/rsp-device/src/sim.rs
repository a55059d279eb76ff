//! Simulated hardware port
//!
//! Records every push instead of talking to a receiver, and acknowledges
//! gain reduction pushes the way the stream callback of a real device
//! would.

use std::sync::Arc;

use parking_lot::Mutex;
use rsp_gain::HardwareRegisters;
use tracing::trace;

use crate::error::DeviceError;
use crate::port::{GainAck, HardwarePort, UpdateReason};

/// How the simulated stream callback answers gain reduction pushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AckBehavior {
    /// Acknowledge every gain reduction push at once
    #[default]
    Immediate,
    /// Never acknowledge, so the device times out
    Never,
}

/// A push seen by the simulated hardware
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedUpdate {
    pub reason: UpdateReason,
    pub regs: HardwareRegisters,
}

#[derive(Debug, Default)]
struct SimLog {
    updates: Vec<RecordedUpdate>,
    stream_regs: Option<HardwareRegisters>,
    streaming: bool,
}

/// Hardware port that records pushes for inspection
///
/// Clones share the same log, so a test can keep one handle while the
/// device owns another.
#[derive(Debug, Clone, Default)]
pub struct SimulatedPort {
    behavior: AckBehavior,
    ack: Option<GainAck>,
    fail_updates: bool,
    log: Arc<Mutex<SimLog>>,
}

impl SimulatedPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Port with the given acknowledgement behaviour
    pub fn with_behavior(behavior: AckBehavior) -> Self {
        Self {
            behavior,
            ..Default::default()
        }
    }

    /// Make every push fail with a hardware error
    pub fn failing(mut self) -> Self {
        self.fail_updates = true;
        self
    }

    /// All pushes so far, oldest first
    pub fn updates(&self) -> Vec<RecordedUpdate> {
        self.log.lock().updates.clone()
    }

    /// Reasons of all pushes so far
    pub fn reasons(&self) -> Vec<UpdateReason> {
        self.log.lock().updates.iter().map(|u| u.reason).collect()
    }

    /// Most recent push
    pub fn last_update(&self) -> Option<RecordedUpdate> {
        self.log.lock().updates.last().cloned()
    }

    /// Registers the stream was last started with
    pub fn stream_registers(&self) -> Option<HardwareRegisters> {
        self.log.lock().stream_regs.clone()
    }

    pub fn is_streaming(&self) -> bool {
        self.log.lock().streaming
    }

    /// Forget recorded pushes
    pub fn clear(&self) {
        self.log.lock().updates.clear();
    }
}

impl HardwarePort for SimulatedPort {
    fn attach(&mut self, ack: GainAck) {
        self.ack = Some(ack);
    }

    fn start_stream(&mut self, regs: &HardwareRegisters) -> Result<(), DeviceError> {
        let mut log = self.log.lock();
        log.stream_regs = Some(regs.clone());
        log.streaming = true;
        Ok(())
    }

    fn stop_stream(&mut self) -> Result<(), DeviceError> {
        self.log.lock().streaming = false;
        Ok(())
    }

    fn apply(&mut self, regs: &HardwareRegisters, reason: UpdateReason) -> Result<(), DeviceError> {
        if self.fail_updates {
            return Err(DeviceError::Hardware(format!("{} update rejected", reason)));
        }

        trace!("Simulated {} update: {}", reason, regs.gain_summary());
        self.log.lock().updates.push(RecordedUpdate {
            reason,
            regs: regs.clone(),
        });

        if reason == UpdateReason::GainReduction && self.behavior == AckBehavior::Immediate {
            if let Some(ack) = &self.ack {
                ack.notify();
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_updates() {
        let mut port = SimulatedPort::new();
        let handle = port.clone();
        let regs = HardwareRegisters::tuned_to(100e6);

        port.apply(&regs, UpdateReason::Agc).unwrap();
        port.apply(&regs, UpdateReason::Frequency).unwrap();
        assert_eq!(
            handle.reasons(),
            vec![UpdateReason::Agc, UpdateReason::Frequency]
        );
        assert_eq!(handle.last_update().unwrap().regs, regs);

        handle.clear();
        assert!(handle.updates().is_empty());
    }

    #[test]
    fn test_immediate_ack() {
        let mut port = SimulatedPort::new();
        let ack = GainAck::new();
        port.attach(ack.clone());

        port.apply(&HardwareRegisters::default(), UpdateReason::Agc)
            .unwrap();
        assert!(!ack.is_set());
        port.apply(&HardwareRegisters::default(), UpdateReason::GainReduction)
            .unwrap();
        assert!(ack.is_set());
    }

    #[test]
    fn test_never_ack() {
        let mut port = SimulatedPort::with_behavior(AckBehavior::Never);
        let ack = GainAck::new();
        port.attach(ack.clone());
        port.apply(&HardwareRegisters::default(), UpdateReason::GainReduction)
            .unwrap();
        assert!(!ack.is_set());
    }

    #[test]
    fn test_failing_port() {
        let mut port = SimulatedPort::new().failing();
        let result = port.apply(&HardwareRegisters::default(), UpdateReason::Agc);
        assert!(matches!(result, Err(DeviceError::Hardware(_))));
        assert!(port.updates().is_empty());
    }

    #[test]
    fn test_stream_state() {
        let mut port = SimulatedPort::new();
        let regs = HardwareRegisters::tuned_to(14e6);
        port.start_stream(&regs).unwrap();
        assert!(port.is_streaming());
        assert_eq!(port.stream_registers(), Some(regs));
        port.stop_stream().unwrap();
        assert!(!port.is_streaming());
    }
}
