//! Sensor drivers.

pub mod max31855;
