//! Blocking delay and uptime adapter.
//!
//! Implements `embedded_hal`'s [`DelayNs`] with `std::thread::sleep`,
//! which ESP-IDF maps onto a FreeRTOS task delay and host maps onto the
//! OS scheduler. The acquisition loop is the only task, so blocking is
//! the whole point.

use std::time::{Duration, Instant};

use embedded_hal::delay::DelayNs;

/// Thread-sleeping delay with a monotonic uptime counter.
#[derive(Debug)]
pub struct ThreadDelay {
    start: Instant,
}

impl Default for ThreadDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadDelay {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Milliseconds since construction (monotonic).
    pub fn uptime_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }
}

impl DelayNs for ThreadDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(u64::from(ns)));
    }

    fn delay_ms(&mut self, ms: u32) {
        std::thread::sleep(Duration::from_millis(u64::from(ms)));
    }
}
