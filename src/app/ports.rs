//! Port traits — the hexagonal boundary between domain logic and the outside world.
//!
//! ```text
//!   Adapter ──▶ Port trait ──▶ AcquisitionLoop (domain)
//! ```
//!
//! Driven adapters (SPI transport, GPIO, event sinks) implement these
//! traits. The [`AcquisitionLoop`](super::service::AcquisitionLoop)
//! consumes them via generics, so the domain core never touches hardware
//! directly.

use crate::error::{BusError, GpioError};
use crate::pins::{MikroBusSocket, PinRole};

/// Physical GPIO number returned by a role lookup.
pub type PinId = u8;

// ───────────────────────────────────────────────────────────────
// Bus port (driven adapter: converter → domain)
// ───────────────────────────────────────────────────────────────

/// Synchronous serial bus carrying the converter's frames.
pub trait BusPort {
    /// Bring the bus up. Must precede any transfer.
    fn init(&mut self) -> Result<(), BusError>;

    /// Route subsequent transfers to the device on `socket`.
    fn select_bus(&mut self, socket: MikroBusSocket) -> Result<(), BusError>;

    /// Clock `rx_len` bytes in, optionally clocking `tx` out.
    fn transfer(&mut self, tx: Option<&[u8]>, rx_len: usize) -> Result<Vec<u8>, BusError>;

    /// Release the bus. Safe to call more than once.
    fn release(&mut self);
}

// ───────────────────────────────────────────────────────────────
// GPIO port (driven adapter: domain → relay coils)
// ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinDirection {
    Input,
    Output,
}

/// Role-addressed GPIO access.
pub trait GpioPort {
    /// Resolve a mikroBUS role on `socket` to a GPIO number.
    fn lookup_pin(&self, socket: MikroBusSocket, role: PinRole) -> Result<PinId, GpioError>;

    /// Reset the pin to its default state.
    fn init_pin(&mut self, pin: PinId) -> Result<(), GpioError>;

    fn set_direction(&mut self, pin: PinId, direction: PinDirection) -> Result<(), GpioError>;

    fn set_value(&mut self, pin: PinId, high: bool) -> Result<(), GpioError>;
}

// ───────────────────────────────────────────────────────────────
// Event sink port (driven adapter: domain → console / telemetry)
// ───────────────────────────────────────────────────────────────

/// The domain emits structured [`AppEvent`](super::events::AppEvent)s
/// through this port. Adapters decide where they go.
pub trait EventSink {
    fn emit(&mut self, event: &super::events::AppEvent);
}
