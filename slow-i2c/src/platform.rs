//! Pin and timing primitives the protocol engine is built on

use {crate::Instant, embedded_hal::digital::PinState};

/// Direction of a GPIO pin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// High impedance, the external pull-up (or a slave) decides the level
    Input,
    /// Driven to the level held in the pin's output latch
    Output,
}

/// Hardware access used by [`SoftI2c`](crate::SoftI2c)
///
/// Implementations must not fail: a pin that cannot be configured is a wiring
/// problem that surfaces as a stuck line during `init`.
pub trait Platform {
    /// Pin identifier, bound once at bus construction
    type Pin: Copy;

    /// Switch a pin between input and output
    fn set_pin_mode(&mut self, pin: Self::Pin, mode: PinMode);

    /// Set the output latch of a pin
    fn write_pin(&mut self, pin: Self::Pin, level: PinState);

    /// Sample the level on a pin
    fn read_pin(&mut self, pin: Self::Pin) -> PinState;

    /// Busy-wait for `us` microseconds
    fn delay_us(&mut self, us: u32);

    /// Sleep for `ms` milliseconds, letting other work run if possible
    fn delay_ms(&mut self, ms: u32);

    /// Current value of a monotonic millisecond clock
    fn now(&mut self) -> Instant;
}
