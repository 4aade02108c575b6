//! MAX31855 cold-junction compensated thermocouple-to-digital converter.
//!
//! The chip clocks out a 32-bit register, MSB first, on every SPI read:
//!
//! ```text
//!  31      18 17 16 15        4  3  2   1   0
//! ┌──────────┬──┬──┬───────────┬──┬───┬───┬───┐
//! │ TC temp  │  │F │ internal  │  │SCV│SCG│OC │
//! │ 14b s.   │  │  │ 12b s.    │  │   │   │   │
//! └──────────┴──┴──┴───────────┴──┴───┴───┴───┘
//! ```
//!
//! Decoding is a pure function of the four bytes; nothing here touches
//! the bus.

use log::trace;

use crate::error::{BusError, SensorFault};

/// Size of one converter frame in bytes.
pub const FRAME_LEN: usize = 4;

/// D16 in byte 1: any fault present.
const FAULT_FLAG: u8 = 0x01;
/// D0 in byte 3.
const FAULT_OPEN_CIRCUIT: u8 = 0x01;
/// D1 in byte 3.
const FAULT_SHORT_GND: u8 = 0x02;
/// D2 in byte 3.
const FAULT_SHORT_VCC: u8 = 0x04;

/// One 4-byte frame exactly as delivered by a bus transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawFrame([u8; FRAME_LEN]);

impl RawFrame {
    pub const fn new(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a frame from the 32-bit register value.
    pub const fn from_register(reg: u32) -> Self {
        Self(reg.to_be_bytes())
    }

    pub const fn bytes(&self) -> [u8; FRAME_LEN] {
        self.0
    }

    pub const fn register(&self) -> u32 {
        u32::from_be_bytes(self.0)
    }

    /// Thermocouple half of the frame (bytes 0–1).
    const fn high_word(&self) -> u16 {
        ((self.0[0] as u16) << 8) | self.0[1] as u16
    }

    /// Internal-junction half of the frame (bytes 2–3).
    const fn low_word(&self) -> u16 {
        ((self.0[2] as u16) << 8) | self.0[3] as u16
    }

    /// Classify the fault bits, or `None` if the fault flag is clear.
    pub fn fault_status(&self) -> Option<SensorFault> {
        if self.0[1] & FAULT_FLAG == 0 {
            return None;
        }
        let detail = self.0[3];
        let fault = if detail & FAULT_OPEN_CIRCUIT != 0 {
            SensorFault::OpenCircuit
        } else if detail & FAULT_SHORT_GND != 0 {
            SensorFault::ShortToGround
        } else if detail & FAULT_SHORT_VCC != 0 {
            SensorFault::ShortToVcc
        } else {
            SensorFault::Unspecified
        };
        Some(fault)
    }
}

impl From<[u8; FRAME_LEN]> for RawFrame {
    fn from(bytes: [u8; FRAME_LEN]) -> Self {
        Self(bytes)
    }
}

impl TryFrom<&[u8]> for RawFrame {
    type Error = BusError;

    fn try_from(buf: &[u8]) -> Result<Self, Self::Error> {
        let bytes: [u8; FRAME_LEN] = buf.try_into().map_err(|_| BusError::ShortRead {
            expected: FRAME_LEN,
            got: buf.len(),
        })?;
        Ok(Self(bytes))
    }
}

/// A fault-free reading, held as exact fixed-point values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemperatureReading {
    /// Thermocouple temperature in 0.25 °C steps.
    pub thermocouple_quarters: i16,
    /// Internal (cold-junction) temperature in 0.0625 °C steps.
    pub internal_sixteenths: i16,
}

impl TemperatureReading {
    pub fn thermocouple_celsius(&self) -> f32 {
        f32::from(self.thermocouple_quarters) * 0.25
    }

    pub fn internal_celsius(&self) -> f32 {
        f32::from(self.internal_sixteenths) * 0.0625
    }
}

/// Decode one frame.
///
/// The temperature words are always computed; the fault flag then decides
/// whether the reading or the fault is returned. Integer parts are
/// arithmetic shifts, so negative temperatures sign-extend; the fraction
/// bits are added as an unsigned magnitude, which for two's complement
/// yields the exact value.
pub fn decode(frame: RawFrame) -> Result<TemperatureReading, SensorFault> {
    trace!("max31855: frame {:02x?}", frame.bytes());

    let hi = frame.high_word();
    let tc_frac = ((hi >> 2) & 0b11) as i16;
    let tc_int = (hi as i16) >> 4;
    let thermocouple_quarters = tc_int * 4 + tc_frac;

    let lo = frame.low_word();
    let int_frac = ((lo >> 4) & 0b1_1111) as i16;
    let int_int = (lo as i16) >> 9;
    let internal_sixteenths = int_int * 16 + int_frac;

    if let Some(fault) = frame.fault_status() {
        return Err(fault);
    }

    Ok(TemperatureReading {
        thermocouple_quarters,
        internal_sixteenths,
    })
}
