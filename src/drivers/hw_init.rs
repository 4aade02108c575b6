//! Raw GPIO access for the relay lines.
//!
//! On ESP-IDF these wrap the `gpio_*` sys calls and return the raw
//! `esp_err_t` on failure. On host they keep pin state in two atomic
//! bitmasks so the simulation and tests can observe what was driven.

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

#[cfg(not(target_os = "espidf"))]
use core::sync::atomic::{AtomicU64, Ordering};

/// Highest GPIO number on the ESP32-S3.
pub const MAX_GPIO: u8 = 48;

// ── Reset ─────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_reset(pin: u8) -> Result<(), i32> {
    // SAFETY: gpio_reset_pin only touches the IO-mux registers of `pin`;
    // relay pins are owned exclusively by the relay driver.
    let ret = unsafe { gpio_reset_pin(i32::from(pin)) };
    if ret != ESP_OK as i32 { return Err(ret); }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_reset(pin: u8) -> Result<(), i32> {
    check_pin(pin)?;
    SIM_OUTPUTS.fetch_and(!(1 << pin), Ordering::Relaxed);
    Ok(())
}

// ── Direction ─────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_set_output(pin: u8, output: bool) -> Result<(), i32> {
    let mode = if output { gpio_mode_t_GPIO_MODE_OUTPUT } else { gpio_mode_t_GPIO_MODE_INPUT };
    // SAFETY: see gpio_reset.
    let ret = unsafe { gpio_set_direction(i32::from(pin), mode) };
    if ret != ESP_OK as i32 { return Err(ret); }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_set_output(pin: u8, output: bool) -> Result<(), i32> {
    check_pin(pin)?;
    if output {
        SIM_OUTPUTS.fetch_or(1 << pin, Ordering::Relaxed);
    } else {
        SIM_OUTPUTS.fetch_and(!(1 << pin), Ordering::Relaxed);
    }
    Ok(())
}

// ── Level ─────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub fn gpio_write(pin: u8, high: bool) -> Result<(), i32> {
    // SAFETY: gpio_set_level writes the output register of a pin already
    // switched to output mode by gpio_set_output. Main-loop only.
    let ret = unsafe { gpio_set_level(i32::from(pin), u32::from(high)) };
    if ret != ESP_OK as i32 { return Err(ret); }
    Ok(())
}

#[cfg(not(target_os = "espidf"))]
pub fn gpio_write(pin: u8, high: bool) -> Result<(), i32> {
    check_pin(pin)?;
    if high {
        SIM_LEVELS.fetch_or(1 << pin, Ordering::Relaxed);
    } else {
        SIM_LEVELS.fetch_and(!(1 << pin), Ordering::Relaxed);
    }
    Ok(())
}

// ── Simulation state ──────────────────────────────────────────

#[cfg(not(target_os = "espidf"))]
static SIM_LEVELS: AtomicU64 = AtomicU64::new(0);
#[cfg(not(target_os = "espidf"))]
static SIM_OUTPUTS: AtomicU64 = AtomicU64::new(0);

/// ESP_ERR_INVALID_ARG, as the real driver reports for a bad pin.
#[cfg(not(target_os = "espidf"))]
const SIM_ERR_INVALID_ARG: i32 = 0x102;

#[cfg(not(target_os = "espidf"))]
fn check_pin(pin: u8) -> Result<(), i32> {
    if pin > MAX_GPIO { Err(SIM_ERR_INVALID_ARG) } else { Ok(()) }
}

/// True if `pin` is configured as output and driven high.
#[cfg(not(target_os = "espidf"))]
pub fn sim_pin_high(pin: u8) -> bool {
    if pin > MAX_GPIO {
        return false;
    }
    let mask = 1u64 << pin;
    SIM_OUTPUTS.load(Ordering::Relaxed) & mask != 0 && SIM_LEVELS.load(Ordering::Relaxed) & mask != 0
}
