//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing application events to the logger
//! (UART / USB-CDC on the device, stderr on host). Readings use the
//! bench rig's console format.

use log::{error, info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;
use crate::error::Error;

/// Adapter that logs every [`AppEvent`] to the serial console.
#[derive(Debug, Default)]
pub struct LogEventSink {
    readings: u64,
    failures: u64,
}

impl LogEventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn readings(&self) -> u64 {
        self.readings
    }

    pub fn failures(&self) -> u64 {
        self.failures
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started {
                channels,
                settle_ms,
            } => {
                info!("START | {} channels, settle {} ms", channels, settle_ms);
            }
            AppEvent::Report {
                channel,
                outcome: Ok(r),
            } => {
                self.readings += 1;
                info!(
                    "Thermocouple {} temp is {:.2} Internal temp is {:.4}",
                    channel,
                    r.thermocouple_celsius(),
                    r.internal_celsius(),
                );
            }
            AppEvent::Report {
                channel,
                outcome: Err(Error::Sensor(fault)),
            } => {
                self.failures += 1;
                warn!("Error reading the temp on {}: {}", channel, fault);
            }
            AppEvent::Report {
                channel,
                outcome: Err(e),
            } => {
                self.failures += 1;
                error!("Error reading the temp on {}: {}", channel, e);
            }
            AppEvent::Stopped { cycles } => {
                info!(
                    "STOP | {} cycles, {} readings, {} failures",
                    cycles, self.readings, self.failures
                );
            }
        }
    }
}
