//! Unified error types for the acquisition firmware.
//!
//! Every port and driver has its own small `Copy` error enum; all of them
//! convert into [`Error`] so the acquisition loop can report a phase
//! outcome with a single type.

use core::fmt;

use crate::pins::{MikroBusSocket, PinRole};

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The SPI transfer to the converter failed.
    Bus(BusError),
    /// The converter flagged a wiring fault.
    Sensor(SensorFault),
    /// A relay could not be resolved or driven.
    Relay(RelayError),
    /// Configuration is invalid.
    Config(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bus(e) => write!(f, "bus: {e}"),
            Self::Sensor(e) => write!(f, "sensor: {e}"),
            Self::Relay(e) => write!(f, "relay: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusError {
    /// `transfer` called before `init`.
    NotInitialized,
    /// `transfer` called before `select_bus`.
    NoBusSelected,
    /// The underlying SPI device reported an error.
    TransferFailed,
    /// Fewer (or more) bytes than requested came back.
    ShortRead { expected: usize, got: usize },
}

impl fmt::Display for BusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotInitialized => write!(f, "bus not initialised"),
            Self::NoBusSelected => write!(f, "no bus selected"),
            Self::TransferFailed => write!(f, "transfer failed"),
            Self::ShortRead { expected, got } => {
                write!(f, "short read ({got} of {expected} bytes)")
            }
        }
    }
}

impl From<BusError> for Error {
    fn from(e: BusError) -> Self {
        Self::Bus(e)
    }
}

// ---------------------------------------------------------------------------
// Sensor faults
// ---------------------------------------------------------------------------

/// Wiring faults reported by the MAX31855 in the low bits of its frame.
///
/// When several detail bits are set, the first in bit order wins:
/// open circuit, then short to GND, then short to Vcc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorFault {
    /// Thermocouple not connected (D0).
    OpenCircuit,
    /// Thermocouple shorted to GND (D1).
    ShortToGround,
    /// Thermocouple shorted to Vcc (D2).
    ShortToVcc,
    /// Fault flag (D16) set with no detail bit.
    Unspecified,
}

impl fmt::Display for SensorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenCircuit => write!(f, "Open circuit"),
            Self::ShortToGround => write!(f, "Short to GND"),
            Self::ShortToVcc => write!(f, "Short to Vcc"),
            Self::Unspecified => write!(f, "Unspecified fault"),
        }
    }
}

impl From<SensorFault> for Error {
    fn from(e: SensorFault) -> Self {
        Self::Sensor(e)
    }
}

// ---------------------------------------------------------------------------
// GPIO / relay errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioError {
    /// The socket has no pin wired for this role.
    LookupFailed { socket: MikroBusSocket, role: PinRole },
    /// Resetting the pin to a known state failed.
    InitFailed(u8),
    /// Setting the pin direction failed.
    DirectionFailed(u8),
    /// Writing the output level failed.
    WriteFailed(u8),
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LookupFailed { socket, role } => {
                write!(f, "no {role:?} pin on {socket:?}")
            }
            Self::InitFailed(pin) => write!(f, "init of GPIO{pin} failed"),
            Self::DirectionFailed(pin) => write!(f, "direction of GPIO{pin} failed"),
            Self::WriteFailed(pin) => write!(f, "write to GPIO{pin} failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveError {
    /// Index outside 1..=4.
    InvalidChannel(u8),
    /// Relay 3 shares its pin with another function on the board.
    ReservedChannel,
    /// The board/socket has no pin for the channel's role.
    PinLookupFailed(GpioError),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidChannel(idx) => write!(f, "invalid relay index {idx}"),
            Self::ReservedChannel => write!(f, "relay 3 is a reserved pin"),
            Self::PinLookupFailed(e) => write!(f, "pin lookup failed: {e}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayError {
    Resolve(ResolveError),
    Gpio(GpioError),
}

impl fmt::Display for RelayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve(e) => write!(f, "{e}"),
            Self::Gpio(e) => write!(f, "{e}"),
        }
    }
}

impl From<ResolveError> for RelayError {
    fn from(e: ResolveError) -> Self {
        Self::Resolve(e)
    }
}

impl From<GpioError> for RelayError {
    fn from(e: GpioError) -> Self {
        Self::Gpio(e)
    }
}

impl From<RelayError> for Error {
    fn from(e: RelayError) -> Self {
        Self::Relay(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
