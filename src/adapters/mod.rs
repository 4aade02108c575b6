//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter       | Implements  | Connects to                      |
//! |---------------|-------------|----------------------------------|
//! | `hardware`    | GpioPort    | ESP32 GPIO / simulated pins      |
//! | `spi`         | BusPort     | any `embedded_hal` SPI device    |
//! | `sim_thermo`  | SpiDevice   | simulated MAX31855 (host only)   |
//! | `log_sink`    | EventSink   | Serial log output                |
//! | `time`        | DelayNs     | thread sleep                     |

pub mod hardware;
pub mod log_sink;
#[cfg(not(target_os = "espidf"))]
pub mod sim_thermo;
pub mod spi;
pub mod time;
