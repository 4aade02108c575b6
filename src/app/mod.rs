//! Application core — pure domain logic, zero I/O.
//!
//! The acquisition loop lives here. All interaction with hardware happens
//! through **port traits** defined in [`ports`], keeping this layer fully
//! testable without real peripherals.

pub mod events;
pub mod ports;
pub mod service;
