//! Relay4 click driver.
//!
//! Four relays, each driven by one mikroBUS line. The line is found by
//! role on whatever socket the click sits in, so the binding is resolved
//! on every call rather than cached.
//!
//! | Relay | Role  |
//! |-------|-------|
//! | 1     | PWM   |
//! | 2     | RST   |
//! | 3     | —     |
//! | 4     | AN    |
//!
//! Relay 3 sits on CS, which the carrier board commits to the SPI bus, so
//! it is never driven.

use core::fmt;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::app::ports::{GpioPort, PinDirection, PinId};
use crate::error::{RelayError, ResolveError};
use crate::pins::{MikroBusSocket, PinRole};

/// Logical relay on the click, numbered as on the silkscreen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelayChannel {
    Relay1,
    Relay2,
    Relay3,
    Relay4,
}

impl RelayChannel {
    pub const ALL: [Self; 4] = [Self::Relay1, Self::Relay2, Self::Relay3, Self::Relay4];

    /// 1-based index.
    pub const fn index(self) -> u8 {
        match self {
            Self::Relay1 => 1,
            Self::Relay2 => 2,
            Self::Relay3 => 3,
            Self::Relay4 => 4,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Relay1 => "Relay1",
            Self::Relay2 => "Relay2",
            Self::Relay3 => "Relay3",
            Self::Relay4 => "Relay4",
        }
    }

    pub const fn is_reserved(self) -> bool {
        matches!(self, Self::Relay3)
    }

    /// mikroBUS role that drives this relay, or `None` for the reserved one.
    pub const fn role(self) -> Option<PinRole> {
        match self {
            Self::Relay1 => Some(PinRole::Pwm),
            Self::Relay2 => Some(PinRole::Reset),
            Self::Relay3 => None,
            Self::Relay4 => Some(PinRole::Analog),
        }
    }
}

impl TryFrom<u8> for RelayChannel {
    type Error = ResolveError;

    fn try_from(index: u8) -> Result<Self, Self::Error> {
        match index {
            1 => Ok(Self::Relay1),
            2 => Ok(Self::Relay2),
            3 => Ok(Self::Relay3),
            4 => Ok(Self::Relay4),
            other => Err(ResolveError::InvalidChannel(other)),
        }
    }
}

impl fmt::Display for RelayChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Resolve a relay to the GPIO that drives it on `socket`.
pub fn resolve(
    gpio: &impl GpioPort,
    socket: MikroBusSocket,
    channel: RelayChannel,
) -> Result<PinId, ResolveError> {
    let Some(role) = channel.role() else {
        warn!("relay: can't set {channel}, it is a reserved pin");
        return Err(ResolveError::ReservedChannel);
    };
    gpio.lookup_pin(socket, role)
        .map_err(ResolveError::PinLookupFailed)
}

/// Like [`resolve`], from a raw 1-based index.
pub fn resolve_index(
    gpio: &impl GpioPort,
    socket: MikroBusSocket,
    index: u8,
) -> Result<PinId, ResolveError> {
    resolve(gpio, socket, RelayChannel::try_from(index)?)
}

/// The relay click on one socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RelayBank {
    socket: MikroBusSocket,
}

impl RelayBank {
    pub fn new(socket: MikroBusSocket) -> Self {
        Self { socket }
    }

    pub fn socket(&self) -> MikroBusSocket {
        self.socket
    }

    pub fn resolve(
        &self,
        gpio: &impl GpioPort,
        channel: RelayChannel,
    ) -> Result<PinId, ResolveError> {
        resolve(gpio, self.socket, channel)
    }

    /// Drive one relay. Init, direction and level must all succeed; on the
    /// first failure the pin is left in whatever state it reached.
    pub fn set_state(
        &self,
        gpio: &mut impl GpioPort,
        channel: RelayChannel,
        enabled: bool,
    ) -> Result<(), RelayError> {
        let pin = self.resolve(gpio, channel)?;
        gpio.init_pin(pin)?;
        gpio.set_direction(pin, PinDirection::Output)?;
        gpio.set_value(pin, enabled)?;
        debug!("relay: {channel} (GPIO{pin}) -> {}", if enabled { "on" } else { "off" });
        Ok(())
    }

    pub fn enable(&self, gpio: &mut impl GpioPort, channel: RelayChannel) -> Result<(), RelayError> {
        self.set_state(gpio, channel, true)
    }

    pub fn disable(&self, gpio: &mut impl GpioPort, channel: RelayChannel) -> Result<(), RelayError> {
        self.set_state(gpio, channel, false)
    }

    /// Drive every usable relay low. Each one is attempted even if an
    /// earlier one fails; the first error is returned.
    pub fn disable_all(&self, gpio: &mut impl GpioPort) -> Result<(), RelayError> {
        let mut first_err = None;
        for channel in RelayChannel::ALL.into_iter().filter(|c| !c.is_reserved()) {
            if let Err(e) = self.disable(gpio, channel) {
                warn!("relay: failed to disable {channel}: {e}");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
