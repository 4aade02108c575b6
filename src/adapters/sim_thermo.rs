//! Host-side MAX31855 behind a Relay4 click.
//!
//! Implements [`SpiDevice`] so it can sit under
//! [`SpiTransport`](super::spi::SpiTransport) exactly where the real SPI
//! driver goes. On every read it checks which relay line the simulated
//! GPIO currently drives high and clocks out the register configured for
//! that channel. With no relay closed the converter sees no thermocouple
//! and reports an open circuit; with more than one closed the junctions
//! are paralleled and it reports a short to GND.

use core::convert::Infallible;

use embedded_hal::spi::{ErrorType, Operation, SpiDevice};
use heapless::Vec;

use crate::drivers::hw_init;
use crate::drivers::relay::RelayChannel;
use crate::pins::{self, MikroBusSocket};
use crate::sensors::max31855::RawFrame;

/// Fault flag plus OC detail bit.
const OPEN_CIRCUIT_REG: u32 = 0x0001_0001;
/// Fault flag plus SCG detail bit.
const SHORT_GND_REG: u32 = 0x0001_0002;

/// Build a datasheet register value from raw two's-complement codes.
///
/// `tc_code` is the 14-bit thermocouple code (0.25 °C/LSB) and
/// `internal_code` the 12-bit cold-junction code (0.0625 °C/LSB).
pub fn register_from_codes(tc_code: i16, internal_code: i16) -> u32 {
    let tc = (tc_code as u32 & 0x3FFF) << 18;
    let internal = (internal_code as u32 & 0x0FFF) << 4;
    tc | internal
}

pub struct SimThermocouple {
    relay_socket: MikroBusSocket,
    channels: Vec<(RelayChannel, RawFrame), 4>,
    reads: u32,
}

impl SimThermocouple {
    pub fn new(relay_socket: MikroBusSocket) -> Self {
        Self {
            relay_socket,
            channels: Vec::new(),
            reads: 0,
        }
    }

    /// Attach a thermocouple to `channel` that always reads `frame`.
    #[must_use]
    pub fn with_channel(mut self, channel: RelayChannel, frame: RawFrame) -> Self {
        self.channels.retain(|(c, _)| *c != channel);
        // Capacity matches the number of relays, so this cannot overflow.
        let _ = self.channels.push((channel, frame));
        self
    }

    /// Total number of SPI reads served.
    pub fn reads(&self) -> u32 {
        self.reads
    }

    /// The frame the converter would clock out right now.
    pub fn current_frame(&self) -> RawFrame {
        let mut closed = self.channels.iter().filter(|(channel, _)| {
            channel
                .role()
                .and_then(|role| pins::gpio_for(self.relay_socket, role))
                .is_some_and(hw_init::sim_pin_high)
        });

        match (closed.next(), closed.next()) {
            (Some((_, frame)), None) => *frame,
            (None, _) => RawFrame::from_register(OPEN_CIRCUIT_REG),
            (Some(_), Some(_)) => RawFrame::from_register(SHORT_GND_REG),
        }
    }
}

impl ErrorType for SimThermocouple {
    type Error = Infallible;
}

impl SpiDevice for SimThermocouple {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        self.reads = self.reads.wrapping_add(1);
        let frame = self.current_frame().bytes();
        // The MAX31855 ignores MOSI; every clocked byte comes from the
        // register, then zeros once all 32 bits are out.
        let mut cursor = 0usize;
        for op in operations {
            match op {
                Operation::Read(buf)
                | Operation::Transfer(buf, _)
                | Operation::TransferInPlace(buf) => {
                    for b in buf.iter_mut() {
                        *b = frame.get(cursor).copied().unwrap_or(0);
                        cursor += 1;
                    }
                }
                Operation::Write(buf) => cursor += buf.len(),
                Operation::DelayNs(_) => {}
            }
        }
        Ok(())
    }
}
