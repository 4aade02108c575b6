//! Acquisition configuration
//!
//! Board wiring and timing for the thermocouple scanner. Defaults match
//! the reference rig: THERMO click in socket 1, Relay4 click in socket 2,
//! one second of settle time per channel.

use heapless::Vec;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::drivers::relay::RelayChannel;
use crate::error::{Error, Result};
use crate::pins::MikroBusSocket;

/// Longest settle interval accepted by [`AcquisitionConfig::validate`].
pub const MAX_SETTLE_MS: u32 = 60_000;

/// Core acquisition configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    // --- Wiring ---
    /// Socket holding the MAX31855 (THERMO click)
    pub thermo_socket: MikroBusSocket,
    /// Socket holding the Relay4 click
    pub relay_socket: MikroBusSocket,
    /// SPI clock for the converter (Hz)
    pub spi_baud_hz: u32,

    // --- Timing ---
    /// Wait between closing a relay and reading the converter (milliseconds)
    pub settle_ms: u32,

    // --- Scan plan ---
    /// Relays visited per cycle, in order
    pub channel_plan: Vec<RelayChannel, 4>,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        let mut channel_plan = Vec::new();
        for ch in [RelayChannel::Relay1, RelayChannel::Relay2, RelayChannel::Relay4] {
            // Three entries into a capacity of four.
            let _ = channel_plan.push(ch);
        }

        Self {
            thermo_socket: MikroBusSocket::One,
            relay_socket: MikroBusSocket::Two,
            spi_baud_hz: 4_000_000, // MAX31855 tops out at 5 MHz
            settle_ms: 1000,
            channel_plan,
        }
    }
}

impl AcquisitionConfig {
    /// Parse a JSON override. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            warn!("config: {e}");
            Error::Config("malformed JSON")
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Reject configurations the acquisition loop can't run safely.
    pub fn validate(&self) -> Result<()> {
        if self.channel_plan.is_empty() {
            return Err(Error::Config("channel plan is empty"));
        }
        if self.channel_plan.iter().any(|c| c.is_reserved()) {
            return Err(Error::Config("channel plan includes reserved relay 3"));
        }
        for (i, ch) in self.channel_plan.iter().enumerate() {
            if self.channel_plan[i + 1..].contains(ch) {
                return Err(Error::Config("channel plan repeats a relay"));
            }
        }
        if self.thermo_socket == self.relay_socket {
            return Err(Error::Config("thermo and relay clicks share a socket"));
        }
        if self.settle_ms > MAX_SETTLE_MS {
            return Err(Error::Config("settle_ms above 60 s"));
        }
        if self.spi_baud_hz == 0 || self.spi_baud_hz > 5_000_000 {
            return Err(Error::Config("spi_baud_hz outside 1 Hz..5 MHz"));
        }
        Ok(())
    }
}
