//! mikroBUS socket pin map.
//!
//! Single source of truth for which GPIO backs each pin role on each
//! socket. Click boards address their lines by role (PWM, RST, AN, ...)
//! and the driver resolves the role against the socket the board sits in.
//!
//! GPIO numbers follow the ESP32-S3 carrier board: two sockets share the
//! SPI lines and each gets its own CS, AN, RST, PWM and INT. The UART and
//! I²C lines are only broken out on socket 1.

use serde::{Deserialize, Serialize};

/// A mikroBUS socket on the carrier board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MikroBusSocket {
    One,
    Two,
}

/// A standard mikroBUS pin role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PinRole {
    /// AN — analog input.
    Analog,
    /// RST — reset.
    Reset,
    /// CS — SPI chip select.
    ChipSelect,
    Sck,
    Miso,
    Mosi,
    Pwm,
    /// INT — interrupt.
    Interrupt,
    Rx,
    Tx,
    Scl,
    Sda,
}

// ---------------------------------------------------------------------------
// Shared SPI lines
// ---------------------------------------------------------------------------

pub const SPI_SCK_GPIO: u8 = 36;
pub const SPI_MISO_GPIO: u8 = 37;
pub const SPI_MOSI_GPIO: u8 = 35;

// ---------------------------------------------------------------------------
// Socket 1
// ---------------------------------------------------------------------------

pub const S1_AN_GPIO: u8 = 4;
pub const S1_RST_GPIO: u8 = 5;
pub const S1_CS_GPIO: u8 = 34;
pub const S1_PWM_GPIO: u8 = 6;
pub const S1_INT_GPIO: u8 = 7;
pub const S1_RX_GPIO: u8 = 18;
pub const S1_TX_GPIO: u8 = 17;
pub const S1_SCL_GPIO: u8 = 9;
pub const S1_SDA_GPIO: u8 = 8;

// ---------------------------------------------------------------------------
// Socket 2
// ---------------------------------------------------------------------------

pub const S2_AN_GPIO: u8 = 10;
pub const S2_RST_GPIO: u8 = 11;
pub const S2_CS_GPIO: u8 = 33;
pub const S2_PWM_GPIO: u8 = 12;
pub const S2_INT_GPIO: u8 = 13;

/// Resolve a pin role on a socket to a GPIO number.
///
/// Returns `None` when the role is not broken out on that socket.
pub const fn gpio_for(socket: MikroBusSocket, role: PinRole) -> Option<u8> {
    match role {
        PinRole::Sck => return Some(SPI_SCK_GPIO),
        PinRole::Miso => return Some(SPI_MISO_GPIO),
        PinRole::Mosi => return Some(SPI_MOSI_GPIO),
        _ => {}
    }

    match socket {
        MikroBusSocket::One => match role {
            PinRole::Analog => Some(S1_AN_GPIO),
            PinRole::Reset => Some(S1_RST_GPIO),
            PinRole::ChipSelect => Some(S1_CS_GPIO),
            PinRole::Pwm => Some(S1_PWM_GPIO),
            PinRole::Interrupt => Some(S1_INT_GPIO),
            PinRole::Rx => Some(S1_RX_GPIO),
            PinRole::Tx => Some(S1_TX_GPIO),
            PinRole::Scl => Some(S1_SCL_GPIO),
            PinRole::Sda => Some(S1_SDA_GPIO),
            PinRole::Sck | PinRole::Miso | PinRole::Mosi => None,
        },
        MikroBusSocket::Two => match role {
            PinRole::Analog => Some(S2_AN_GPIO),
            PinRole::Reset => Some(S2_RST_GPIO),
            PinRole::ChipSelect => Some(S2_CS_GPIO),
            PinRole::Pwm => Some(S2_PWM_GPIO),
            PinRole::Interrupt => Some(S2_INT_GPIO),
            _ => None,
        },
    }
}
