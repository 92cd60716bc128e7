//! [`Platform`] over embedded-hal 1.0 pins
//!
//! embedded-hal has no way to switch a pin between input and output, so each
//! line must be an open-drain output that can also be read back
//! (`OutputPin + InputPin`). Pulling low stands in for output mode, releasing
//! (`set_high` on an open-drain pin) stands in for input mode.

use {
    crate::{
        bus::SoftI2c,
        config::Config,
        platform::{PinMode, Platform},
        Instant,
    },
    embedded_hal::{
        delay::DelayNs,
        digital::{InputPin, OutputPin, PinState},
    },
};

/// Monotonic millisecond clock
pub trait MillisClock {
    fn now(&mut self) -> Instant;
}

impl<F: FnMut() -> Instant> MillisClock for F {
    fn now(&mut self) -> Instant {
        self()
    }
}

/// Line selector for [`HalPlatform`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinId {
    Sda,
    Scl,
}

#[derive(Clone, Copy)]
struct PinConfig {
    mode: PinMode,
    latch: PinState,
}

impl PinConfig {
    const RELEASED: Self = Self {
        mode: PinMode::Input,
        latch: PinState::Low,
    };

    fn pulls_low(&self) -> bool {
        self.mode == PinMode::Output && self.latch == PinState::Low
    }
}

/// Platform built from two open-drain pins, a delay and a clock
pub struct HalPlatform<SDA, SCL, D, C> {
    sda: SDA,
    scl: SCL,
    delay: D,
    clock: C,
    sda_config: PinConfig,
    scl_config: PinConfig,
}

impl<SDA, SCL, D, C> HalPlatform<SDA, SCL, D, C>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin + InputPin,
    D: DelayNs,
    C: MillisClock,
{
    pub fn new(sda: SDA, scl: SCL, delay: D, clock: C) -> Self {
        Self {
            sda,
            scl,
            delay,
            clock,
            sda_config: PinConfig::RELEASED,
            scl_config: PinConfig::RELEASED,
        }
    }

    /// Wrap into a bus with default timing
    pub fn into_bus(self) -> SoftI2c<Self> {
        SoftI2c::new(self, PinId::Sda, PinId::Scl)
    }

    /// Wrap into a bus with custom timing
    pub fn into_bus_with_config(self, config: Config) -> SoftI2c<Self> {
        SoftI2c::with_config(self, PinId::Sda, PinId::Scl, config)
    }

    /// Give back the pins, delay and clock
    pub fn free(self) -> (SDA, SCL, D, C) {
        (self.sda, self.scl, self.delay, self.clock)
    }

    fn config_mut(&mut self, pin: PinId) -> &mut PinConfig {
        match pin {
            PinId::Sda => &mut self.sda_config,
            PinId::Scl => &mut self.scl_config,
        }
    }

    /// Drive the physical pin from its mode and latch
    ///
    /// Only output mode with a low latch pulls the line down, everything else
    /// releases it.
    fn apply(&mut self, pin: PinId) {
        let pull_low = self.config_mut(pin).pulls_low();

        let result = match (pin, pull_low) {
            (PinId::Sda, true) => self.sda.set_low().map_err(|_| ()),
            (PinId::Sda, false) => self.sda.set_high().map_err(|_| ()),
            (PinId::Scl, true) => self.scl.set_low().map_err(|_| ()),
            (PinId::Scl, false) => self.scl.set_high().map_err(|_| ()),
        };

        if result.is_err() {
            warn!("failed to set {}", pin);
        }
    }
}

impl<SDA, SCL, D, C> Platform for HalPlatform<SDA, SCL, D, C>
where
    SDA: OutputPin + InputPin,
    SCL: OutputPin + InputPin,
    D: DelayNs,
    C: MillisClock,
{
    type Pin = PinId;

    fn set_pin_mode(&mut self, pin: PinId, mode: PinMode) {
        self.config_mut(pin).mode = mode;
        self.apply(pin);
    }

    fn write_pin(&mut self, pin: PinId, level: PinState) {
        self.config_mut(pin).latch = level;
        self.apply(pin);
    }

    fn read_pin(&mut self, pin: PinId) -> PinState {
        let high = match pin {
            PinId::Sda => self.sda.is_high().map_err(|_| ()),
            PinId::Scl => self.scl.is_high().map_err(|_| ()),
        };

        match high {
            Ok(high) => high.into(),
            Err(()) => {
                warn!("failed to read {}", pin);
                PinState::Low
            }
        }
    }

    fn delay_us(&mut self, us: u32) {
        self.delay.delay_us(us);
    }

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn now(&mut self) -> Instant {
        self.clock.now()
    }
}
