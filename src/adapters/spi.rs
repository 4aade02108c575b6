//! SPI transport adapter.
//!
//! Implements [`BusPort`] on top of any `embedded_hal` 1.0 [`SpiDevice`].
//! The device owns chip-select, so a transfer is a single transaction. On
//! ESP-IDF the device is an `esp_idf_hal` `SpiDeviceDriver`; on host it is
//! the [`SimThermocouple`](super::sim_thermo::SimThermocouple).

use embedded_hal::spi::{Operation, SpiDevice};
use log::{debug, info, warn};

use crate::app::ports::BusPort;
use crate::error::BusError;
use crate::pins::MikroBusSocket;

/// [`BusPort`] over an `embedded_hal` SPI device wired to one socket.
pub struct SpiTransport<D> {
    device: D,
    socket: MikroBusSocket,
    initialised: bool,
    selected: bool,
}

impl<D: SpiDevice> SpiTransport<D> {
    /// `socket` is the socket whose CS line `device` asserts.
    pub fn new(device: D, socket: MikroBusSocket) -> Self {
        Self {
            device,
            socket,
            initialised: false,
            selected: false,
        }
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn is_initialised(&self) -> bool {
        self.initialised
    }
}

impl<D: SpiDevice> BusPort for SpiTransport<D> {
    fn init(&mut self) -> Result<(), BusError> {
        self.initialised = true;
        info!("spi: bus initialised");
        Ok(())
    }

    fn select_bus(&mut self, socket: MikroBusSocket) -> Result<(), BusError> {
        if !self.initialised {
            return Err(BusError::NotInitialized);
        }
        if socket != self.socket {
            warn!("spi: no device on {:?} (device is on {:?})", socket, self.socket);
            self.selected = false;
            return Err(BusError::NoBusSelected);
        }
        self.selected = true;
        debug!("spi: selected {:?}", socket);
        Ok(())
    }

    fn transfer(&mut self, tx: Option<&[u8]>, rx_len: usize) -> Result<Vec<u8>, BusError> {
        if !self.initialised {
            return Err(BusError::NotInitialized);
        }
        if !self.selected {
            return Err(BusError::NoBusSelected);
        }

        let mut rx = vec![0u8; rx_len];
        let result = match tx {
            Some(tx) => self.device.transaction(&mut [Operation::Transfer(rx.as_mut_slice(), tx)]),
            None => self.device.transaction(&mut [Operation::Read(rx.as_mut_slice())]),
        };
        result.map_err(|e| {
            warn!("spi: transfer failed: {:?}", e);
            BusError::TransferFailed
        })?;
        Ok(rx)
    }

    fn release(&mut self) {
        if self.initialised {
            info!("spi: bus released");
        }
        self.initialised = false;
        self.selected = false;
    }
}
