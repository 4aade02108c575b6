//! THERMO click scanner library.
//!
//! Decodes MAX31855 thermocouple frames and multiplexes one converter
//! across several thermocouples through a Relay4 click. Exposes the
//! pure-logic modules for integration testing. All ESP-IDF-specific code
//! is guarded by `#[cfg(target_os = "espidf")]` within each module.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod drivers;
pub mod error;
pub mod pins;
pub mod sensors;
