//! Acquisition loop — the hexagonal core.
//!
//! [`AcquisitionLoop`] walks the relay plan one channel at a time: open
//! the other relays, close this one, let the junction settle, clock one
//! frame out of the converter, decode it and report. Every port is
//! injected, so the whole loop runs against mocks in tests.
//!
//! ```text
//!   GpioPort ◀── ┌────────────────────────┐ ──▶ EventSink
//!                │    AcquisitionLoop     │
//!    BusPort ◀── │ relay plan · decoder   │ ◀── DelayNs
//!                └────────────────────────┘
//! ```
//!
//! No error escapes a phase. A failed relay write skips that phase's read
//! and marks the relay state unknown, so the next phase opens every relay
//! before closing its own.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use embedded_hal::delay::DelayNs;
use log::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::drivers::relay::{RelayBank, RelayChannel};
use crate::error::{Error, RelayError};
use crate::sensors::max31855::{self, FRAME_LEN, RawFrame, TemperatureReading};

use super::events::AppEvent;
use super::ports::{BusPort, EventSink, GpioPort};

// ───────────────────────────────────────────────────────────────
// Stop signal
// ───────────────────────────────────────────────────────────────

/// Cloneable cancellation flag shared with a signal handler.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

// ───────────────────────────────────────────────────────────────
// Relay bookkeeping
// ───────────────────────────────────────────────────────────────

/// What the loop knows about the relay coils.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayState {
    /// Every relay in the plan is open.
    AllOpen,
    /// Exactly this relay is closed.
    Closed(RelayChannel),
    /// A write failed; any relay may be closed.
    Unknown,
}

// ───────────────────────────────────────────────────────────────
// AcquisitionLoop
// ───────────────────────────────────────────────────────────────

pub struct AcquisitionLoop<B, G, D> {
    bus: B,
    gpio: G,
    delay: D,
    config: AcquisitionConfig,
    relays: RelayBank,
    relay_state: RelayState,
    /// Index into `config.channel_plan` of the next phase.
    next_phase: usize,
    cycles: u64,
    started: bool,
}

impl<B, G, D> AcquisitionLoop<B, G, D>
where
    B: BusPort,
    G: GpioPort,
    D: DelayNs,
{
    /// Build the loop. The config must already be validated.
    pub fn new(bus: B, gpio: G, delay: D, config: AcquisitionConfig) -> Self {
        let relays = RelayBank::new(config.relay_socket);
        Self {
            bus,
            gpio,
            delay,
            config,
            relays,
            relay_state: RelayState::Unknown,
            next_phase: 0,
            cycles: 0,
            started: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Bring the bus up and route it to the converter's socket.
    pub fn start(&mut self, sink: &mut impl EventSink) -> Result<(), Error> {
        self.bus.init()?;
        if let Err(e) = self.bus.select_bus(self.config.thermo_socket) {
            self.bus.release();
            return Err(e.into());
        }
        self.started = true;
        info!(
            "acquisition: started on {:?}, relays on {:?}, settle {} ms",
            self.config.thermo_socket,
            self.relays.socket(),
            self.config.settle_ms
        );
        sink.emit(&AppEvent::Started {
            channels: self.config.channel_plan.len(),
            settle_ms: self.config.settle_ms,
        });
        Ok(())
    }

    /// Run phases until `stop` is raised, then shut down.
    ///
    /// The stop flag is checked before every phase and again after the
    /// settle delay, so a stop lands within one settle interval.
    pub fn run(&mut self, stop: &StopSignal, sink: &mut impl EventSink) {
        if self.config.channel_plan.is_empty() {
            warn!("acquisition: channel plan is empty, nothing to scan");
        }
        while !stop.is_stop_requested() && !self.config.channel_plan.is_empty() {
            self.run_phase(Some(stop), sink);
        }
        self.shutdown(sink);
    }

    /// Run one full pass over the channel plan.
    pub fn run_cycle(&mut self, sink: &mut impl EventSink) {
        for _ in 0..self.config.channel_plan.len() {
            self.run_phase(None, sink);
        }
    }

    /// Open all relays and release the bus. Safe to call more than once.
    pub fn shutdown(&mut self, sink: &mut impl EventSink) {
        if let Err(e) = self.relays.disable_all(&mut self.gpio) {
            warn!("acquisition: could not open all relays on shutdown: {e}");
            self.relay_state = RelayState::Unknown;
        } else {
            self.relay_state = RelayState::AllOpen;
        }
        if self.started {
            self.bus.release();
            self.started = false;
            info!("acquisition: stopped after {} cycles", self.cycles);
            sink.emit(&AppEvent::Stopped {
                cycles: self.cycles,
            });
        }
    }

    // ── Phases ────────────────────────────────────────────────

    /// Run the next phase of the plan and emit its report.
    ///
    /// With a stop signal, a stop raised during the settle delay skips
    /// the read and no report is emitted. An empty plan does nothing.
    pub fn run_phase(&mut self, stop: Option<&StopSignal>, sink: &mut impl EventSink) {
        let len = self.config.channel_plan.len();
        let Some(&channel) = self.config.channel_plan.get(self.next_phase) else {
            warn!("acquisition: no channel at phase {} of {len}", self.next_phase);
            self.next_phase = 0;
            return;
        };
        let index = self.next_phase;
        self.next_phase = (index + 1) % len;

        let reported = self.phase(index, channel, stop, sink);

        // A pass only counts once its last phase has reported.
        if reported && self.next_phase == 0 {
            self.cycles += 1;
        }
    }

    /// Returns `false` if the phase ended without a report.
    fn phase(
        &mut self,
        index: usize,
        channel: RelayChannel,
        stop: Option<&StopSignal>,
        sink: &mut impl EventSink,
    ) -> bool {
        if let Err(e) = self.switch_to(index, channel) {
            warn!("acquisition: {channel} skipped: {e}");
            sink.emit(&AppEvent::Report {
                channel,
                outcome: Err(e.into()),
            });
            return true;
        }

        self.delay.delay_ms(self.config.settle_ms);
        if stop.is_some_and(StopSignal::is_stop_requested) {
            debug!("acquisition: stop during settle of {channel}");
            return false;
        }

        let outcome = self.acquire();
        sink.emit(&AppEvent::Report { channel, outcome });
        true
    }

    /// Open whatever may be closed, then close `channel`.
    fn switch_to(&mut self, index: usize, channel: RelayChannel) -> Result<(), RelayError> {
        let sweep = index == 0 || self.relay_state == RelayState::Unknown;
        if sweep {
            let plan = self.config.channel_plan.clone();
            for other in plan.into_iter().filter(|&c| c != channel) {
                self.open(other)?;
            }
        } else if let RelayState::Closed(prev) = self.relay_state {
            if prev != channel {
                self.open(prev)?;
            }
        }
        self.relay_state = RelayState::AllOpen;

        if let Err(e) = self.relays.enable(&mut self.gpio, channel) {
            self.relay_state = RelayState::Unknown;
            if self.relays.disable_all(&mut self.gpio).is_ok() {
                self.relay_state = RelayState::AllOpen;
            }
            return Err(e);
        }
        self.relay_state = RelayState::Closed(channel);
        Ok(())
    }

    fn open(&mut self, channel: RelayChannel) -> Result<(), RelayError> {
        self.relays.disable(&mut self.gpio, channel).inspect_err(|_| {
            self.relay_state = RelayState::Unknown;
        })
    }

    /// One 4-byte read, decoded.
    fn acquire(&mut self) -> Result<TemperatureReading, Error> {
        let rx = self.bus.transfer(None, FRAME_LEN)?;
        let frame = RawFrame::try_from(rx.as_slice())?;
        max31855::decode(frame).map_err(Error::from)
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn relay_state(&self) -> RelayState {
        self.relay_state
    }

    /// Completed passes over the plan.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn config(&self) -> &AcquisitionConfig {
        &self.config
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn gpio(&self) -> &G {
        &self.gpio
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }
}
