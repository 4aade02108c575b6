//! Hardware adapter — bridges the board's GPIO to [`GpioPort`].
//!
//! Role lookups go through the static socket map in [`pins`]; pin writes
//! go through [`hw_init`], which on non-espidf targets is the in-memory
//! simulation.

use log::trace;

use crate::app::ports::{GpioPort, PinDirection, PinId};
use crate::drivers::hw_init;
use crate::error::GpioError;
use crate::pins::{self, MikroBusSocket, PinRole};

/// Concrete GPIO adapter for the carrier board.
#[derive(Debug, Default)]
pub struct HardwareAdapter;

impl HardwareAdapter {
    pub fn new() -> Self {
        Self
    }
}

impl GpioPort for HardwareAdapter {
    fn lookup_pin(&self, socket: MikroBusSocket, role: PinRole) -> Result<PinId, GpioError> {
        pins::gpio_for(socket, role).ok_or(GpioError::LookupFailed { socket, role })
    }

    fn init_pin(&mut self, pin: PinId) -> Result<(), GpioError> {
        hw_init::gpio_reset(pin).map_err(|rc| {
            trace!("gpio_reset({pin}) rc={rc}");
            GpioError::InitFailed(pin)
        })
    }

    fn set_direction(&mut self, pin: PinId, direction: PinDirection) -> Result<(), GpioError> {
        let output = direction == PinDirection::Output;
        hw_init::gpio_set_output(pin, output).map_err(|rc| {
            trace!("gpio_set_direction({pin}) rc={rc}");
            GpioError::DirectionFailed(pin)
        })
    }

    fn set_value(&mut self, pin: PinId, high: bool) -> Result<(), GpioError> {
        hw_init::gpio_write(pin, high).map_err(|rc| {
            trace!("gpio_set_level({pin}) rc={rc}");
            GpioError::WriteFailed(pin)
        })
    }
}
