//! THERMO click scanner — main entry point.
//!
//! One MAX31855 thermocouple converter is multiplexed across several
//! thermocouples by a Relay4 click. Each phase closes one relay, waits for
//! the junction to settle, reads the converter and logs the result.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  SpiTransport      HardwareAdapter   LogEventSink  ThreadDelay │
//! │  (BusPort)         (GpioPort)        (EventSink)   (DelayNs)   │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │           AcquisitionLoop (pure logic)                 │    │
//! │  │  relay plan · MAX31855 decoder                         │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! On the device the bus is the ESP32-S3 SPI2 host. On host the converter
//! is simulated and `THERMOCLICK_CONFIG` may name a JSON config file.
#![deny(unused_must_use)]

use anyhow::Result;
use log::info;

use thermoclick::adapters::hardware::HardwareAdapter;
use thermoclick::adapters::log_sink::LogEventSink;
use thermoclick::adapters::spi::SpiTransport;
use thermoclick::adapters::time::ThreadDelay;
use thermoclick::app::service::{AcquisitionLoop, StopSignal};
use thermoclick::config::AcquisitionConfig;

#[cfg(target_os = "espidf")]
fn main() -> Result<()> {
    use esp_idf_hal::gpio::{AnyIOPin, IOPin};
    use esp_idf_hal::peripherals::Peripherals;
    use esp_idf_hal::spi::config::{Config as SpiConfig, MODE_0};
    use esp_idf_hal::spi::{SpiDeviceDriver, SpiDriver, SpiDriverConfig};
    use esp_idf_hal::units::Hertz;
    use thermoclick::pins::MikroBusSocket;

    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;
    banner();

    let config = AcquisitionConfig::default();
    config.validate()?;

    // ── 2. SPI2 on the shared mikroBUS lines ──────────────────
    // SCK 36, MOSI 35, MISO 37 (see pins.rs). CS follows the socket.
    let p = Peripherals::take()?;
    let cs: AnyIOPin = match config.thermo_socket {
        MikroBusSocket::One => p.pins.gpio34.downgrade(),
        MikroBusSocket::Two => p.pins.gpio33.downgrade(),
    };
    let driver = SpiDriver::new(
        p.spi2,
        p.pins.gpio36,
        p.pins.gpio35,
        Some(p.pins.gpio37),
        &SpiDriverConfig::new(),
    )?;
    let device = SpiDeviceDriver::new(
        driver,
        Some(cs),
        &SpiConfig::new()
            .baudrate(Hertz(config.spi_baud_hz))
            .data_mode(MODE_0),
    )?;
    let bus = SpiTransport::new(device, config.thermo_socket);

    // ── 3. Run forever ────────────────────────────────────────
    // Nothing raises the stop signal on the device; power-off is the stop.
    run(bus, config, StopSignal::new())
}

#[cfg(not(target_os = "espidf"))]
fn main() -> Result<()> {
    use std::io::Write;

    use log::{LevelFilter, warn};
    use thermoclick::adapters::sim_thermo::{SimThermocouple, register_from_codes};
    use thermoclick::drivers::relay::RelayChannel;
    use thermoclick::sensors::max31855::RawFrame;

    // ── 1. Logging ────────────────────────────────────────────
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
    banner();

    // ── 2. Config (file override or defaults) ─────────────────
    let config = match std::env::var("THERMOCLICK_CONFIG") {
        Ok(path) => match std::fs::read_to_string(&path)
            .map_err(anyhow::Error::from)
            .and_then(|json| Ok(AcquisitionConfig::from_json(&json)?))
        {
            Ok(cfg) => {
                info!("Config loaded from {path}");
                cfg
            }
            Err(e) => {
                warn!("Config {path} unusable ({e}), using defaults");
                AcquisitionConfig::default()
            }
        },
        Err(_) => AcquisitionConfig::default(),
    };

    // ── 3. Simulated converter ────────────────────────────────
    // Relay1: 124.50 °C, Relay2: 25.75 °C, Relay4: nothing wired, so it
    // reads as an open circuit.
    let sim = SimThermocouple::new(config.relay_socket)
        .with_channel(RelayChannel::Relay1, RawFrame::from_register(0x07C8_0F80))
        .with_channel(
            RelayChannel::Relay2,
            RawFrame::from_register(register_from_codes(103, 336)),
        );
    let bus = SpiTransport::new(sim, config.thermo_socket);

    // ── 4. Ctrl-C stops the loop between phases ───────────────
    let stop = StopSignal::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || handler_stop.request_stop())
        .map_err(|e| anyhow::anyhow!("signal handler setup failed: {e}"))?;

    run(bus, config, stop)
}

fn banner() {
    info!("╔══════════════════════════════════════╗");
    info!("║  THERMO click scanner v{}          ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");
}

fn run<B>(bus: B, config: AcquisitionConfig, stop: StopSignal) -> Result<()>
where
    B: thermoclick::app::ports::BusPort,
{
    let mut sink = LogEventSink::new();
    let mut acq = AcquisitionLoop::new(bus, HardwareAdapter::new(), ThreadDelay::new(), config);
    acq.start(&mut sink)?;
    acq.run(&stop, &mut sink);
    info!(
        "Exiting after {} ms: {} channels, {} readings, {} failures",
        acq.delay().uptime_ms(),
        acq.config().channel_plan.len(),
        sink.readings(),
        sink.failures()
    );
    Ok(())
}
