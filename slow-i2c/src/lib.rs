//! Bit-banged I2C master over two GPIO lines.
//!
//! SDA and SCL are emulated as open-drain lines: a line is either driven low
//! (pin in output mode) or released (pin in input mode, pulled up externally).
//! Slave clock stretching is honoured with a tiered wait: a short busy-poll,
//! then 1 ms yields, then a hard timeout.
//!
//! The hardware is reached only through the [`Platform`] trait, so the same
//! protocol engine runs on any microcontroller or against a simulated bus on
//! the host. [`HalPlatform`] implements it for embedded-hal 1.0 pins.
//!
//! ```ignore
//! let mut bus = SoftI2c::new(platform, SDA_PIN, SCL_PIN);
//! if !bus.init() {
//!     // lines stuck low or pull-ups missing
//! }
//! if bus.start(0x3C << 1) {
//!     bus.write(0x00);
//! }
//! bus.stop();
//! ```

#![cfg_attr(not(test), no_std)]

// must be first so the macros are visible to the other modules
mod fmt;

pub mod address;
pub mod bus;
pub mod config;
pub mod error;
pub mod i2c;
pub mod line;
pub mod pins;
pub mod platform;
pub mod stretch;
mod transfer;

#[cfg(test)]
mod sim;

pub use {
    address::AddressByte,
    bus::{BusState, SoftI2c},
    config::{Config, BUSY_WAIT_MS, DELAY_US, RECOVERY_PULSES, STRETCH_TIMEOUT_MS},
    error::{Error, Nack},
    line::LineState,
    pins::{HalPlatform, MillisClock, PinId},
    platform::{PinMode, Platform},
    stretch::{StretchPhase, StretchTimeout},
    transfer::READ_TIMEOUT_SENTINEL,
};

/// Millisecond timestamp from the platform's monotonic clock
pub type Instant = fugit::Instant<u64, 1, 1000>;

/// Millisecond duration
pub type Duration = fugit::Duration<u64, 1, 1000>;
