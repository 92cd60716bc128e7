//! Open-drain emulation for a single bus line

use {
    crate::platform::{PinMode, Platform},
    embedded_hal::digital::PinState,
};

/// Last commanded state of a line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineState {
    /// Pin is an input, the pull-up holds the line high unless a slave drives it
    Released,
    /// Pin is an output pulling the line low
    Driven,
}

/// One of SDA/SCL
///
/// A released line is never driven high: two devices driving opposite levels
/// would short the bus.
pub(crate) struct Line<Pin> {
    pin: Pin,
    state: LineState,
}

impl<Pin: Copy> Line<Pin> {
    pub fn new(pin: Pin) -> Self {
        Self {
            pin,
            state: LineState::Released,
        }
    }

    /// Pull the line low
    pub fn set_low<P: Platform<Pin = Pin>>(&mut self, platform: &mut P) {
        platform.set_pin_mode(self.pin, PinMode::Output);
        self.state = LineState::Driven;
    }

    /// Let the line float high
    pub fn set_high<P: Platform<Pin = Pin>>(&mut self, platform: &mut P) {
        platform.set_pin_mode(self.pin, PinMode::Input);
        self.state = LineState::Released;
    }

    /// Clear the output latch so that output mode means "low"
    pub fn clear_latch<P: Platform<Pin = Pin>>(&self, platform: &mut P) {
        platform.write_pin(self.pin, PinState::Low);
    }

    pub fn read<P: Platform<Pin = Pin>>(&self, platform: &mut P) -> PinState {
        platform.read_pin(self.pin)
    }

    pub fn is_low<P: Platform<Pin = Pin>>(&self, platform: &mut P) -> bool {
        self.read(platform) == PinState::Low
    }

    pub fn last_commanded(&self) -> LineState {
        self.state
    }

    pub fn is_released(&self) -> bool {
        self.state == LineState::Released
    }
}
