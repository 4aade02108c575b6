//! Outbound application events.
//!
//! The [`AcquisitionLoop`](super::service::AcquisitionLoop) emits these
//! through the [`EventSink`](super::ports::EventSink) port. Every phase of
//! the loop ends in exactly one [`AppEvent::Report`], unless a stop lands
//! during its settle delay.

use crate::drivers::relay::RelayChannel;
use crate::error::Error;
use crate::sensors::max31855::TemperatureReading;

/// Structured events emitted by the acquisition core.
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// The bus is up and the loop is about to run the first phase.
    Started { channels: usize, settle_ms: u32 },

    /// Outcome of one phase: a reading or the reason there is none.
    Report {
        channel: RelayChannel,
        outcome: Result<TemperatureReading, Error>,
    },

    /// The loop stopped and the bus has been released.
    Stopped { cycles: u64 },
}
