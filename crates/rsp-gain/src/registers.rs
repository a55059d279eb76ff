//! Hardware register block shared by the gain modes
//!
//! The enclosing device owns one `HardwareRegisters` per tuner channel
//! and lends it to the active gain mode for the duration of each call.
//! Gain modes write the LNA state, IF gain reduction and AGC fields;
//! the tuner fields are written by the frequency and antenna code and
//! only read here to select the current gain reduction row.

/// Lowest IF gain reduction in normal operation (dB)
pub const NORMAL_MIN_GR: i32 = 20;

/// Highest IF (baseband) gain reduction (dB)
pub const MAX_BB_GR: i32 = 59;

/// AGC enable register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AgcControl {
    /// IF gain reduction is set by the client
    Disabled,
    /// AGC with a 50 Hz loop, used when RF gain is fixed externally
    #[default]
    Hz50,
    /// Continuous-control AGC
    CtrlEnabled,
}

impl AgcControl {
    /// Whether the AGC owns the IF gain reduction register
    pub fn is_enabled(&self) -> bool {
        !matches!(self, AgcControl::Disabled)
    }

    /// Get human-readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Hz50 => "50Hz",
            Self::CtrlEnabled => "ctrl",
        }
    }
}

/// Antenna port feeding the tuner, as far as the gain tables care
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AntennaPort {
    /// Any 50 ohm port
    #[default]
    Standard,
    /// Hi-Z AM port (RSP2 and RSPduo tuner 1)
    HighZ,
}

/// Gain and tuner registers of one receiver channel
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HardwareRegisters {
    /// Index into the current gain reduction row
    pub lna_state: u8,
    /// IF gain reduction in dB, [`NORMAL_MIN_GR`]..=[`MAX_BB_GR`]
    pub if_gain_reduction_db: i32,
    /// AGC enable state
    pub agc: AgcControl,
    /// AGC set point in dBFS
    pub agc_set_point_dbfs: i32,
    /// Tuned RF frequency in Hz
    pub rf_hz: f64,
    /// Selected antenna port
    pub antenna_port: AntennaPort,
    /// RSPdx HDR mode
    pub hdr_enabled: bool,
}

impl Default for HardwareRegisters {
    /// Power-on defaults of the vendor API: 200 MHz, 50 dB IF
    /// reduction, LNA state 0, 50 Hz AGC at -30 dBFS
    fn default() -> Self {
        Self {
            lna_state: 0,
            if_gain_reduction_db: 50,
            agc: AgcControl::Hz50,
            agc_set_point_dbfs: -30,
            rf_hz: 200_000_000.0,
            antenna_port: AntennaPort::Standard,
            hdr_enabled: false,
        }
    }
}

impl HardwareRegisters {
    /// Registers tuned to `rf_hz` with every other field at its default
    pub fn tuned_to(rf_hz: f64) -> Self {
        Self {
            rf_hz,
            ..Default::default()
        }
    }

    /// Write the AGC register if it differs, reporting whether it changed
    pub fn set_agc(&mut self, agc: AgcControl) -> bool {
        if self.agc != agc {
            self.agc = agc;
            true
        } else {
            false
        }
    }

    /// Write the LNA state if it differs, reporting whether it changed
    pub fn set_lna_state(&mut self, lna_state: u8) -> bool {
        if self.lna_state != lna_state {
            self.lna_state = lna_state;
            true
        } else {
            false
        }
    }

    /// Write the IF gain reduction if it differs, reporting whether it changed
    pub fn set_if_gain_reduction(&mut self, gr_db: i32) -> bool {
        if self.if_gain_reduction_db != gr_db {
            self.if_gain_reduction_db = gr_db;
            true
        } else {
            false
        }
    }

    /// Format frequency for display
    pub fn frequency_display(&self) -> String {
        format!("{:.3} MHz", self.rf_hz / 1_000_000.0)
    }

    /// Get a summary of the gain registers
    pub fn gain_summary(&self) -> String {
        format!(
            "{} LNA={} IFGR={}dB AGC={}",
            self.frequency_display(),
            self.lna_state,
            self.if_gain_reduction_db,
            self.agc.name()
        )
    }
}
