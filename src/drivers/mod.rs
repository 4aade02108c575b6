//! Relay driver and low-level GPIO helpers.

pub mod hw_init;
pub mod relay;
