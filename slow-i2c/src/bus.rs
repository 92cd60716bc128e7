//! Bus handle and start/stop sequencing

use {
    crate::{
        config::Config,
        error::{Error, Nack},
        line::{Line, LineState},
        platform::Platform,
    },
    embedded_hal::digital::PinState,
};

/// Bus state derived from the commanded line states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// Both lines released
    Idle,
    /// The master holds at least one line, a transfer is in progress
    Started,
}

/// Bit-banged I2C master
///
/// SDA and SCL are bound at construction and never change. No hardware is
/// touched until [`SoftI2c::init`] is called.
pub struct SoftI2c<P: Platform> {
    pub(crate) platform: P,
    pub(crate) sda: Line<P::Pin>,
    pub(crate) scl: Line<P::Pin>,
    pub(crate) config: Config,
}

impl<P: Platform> SoftI2c<P> {
    /// Create a bus with default timing
    pub fn new(platform: P, sda: P::Pin, scl: P::Pin) -> Self {
        Self::with_config(platform, sda, scl, Config::default())
    }

    /// Create a bus with custom timing
    pub fn with_config(platform: P, sda: P::Pin, scl: P::Pin, config: Config) -> Self {
        Self {
            platform,
            sda: Line::new(sda),
            scl: Line::new(scl),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    /// Tear the bus down, returning the platform
    pub fn release(self) -> P {
        self.platform
    }

    pub fn sda_state(&self) -> LineState {
        self.sda.last_commanded()
    }

    pub fn scl_state(&self) -> LineState {
        self.scl.last_commanded()
    }

    pub fn state(&self) -> BusState {
        if self.sda.is_released() && self.scl.is_released() {
            BusState::Idle
        } else {
            BusState::Started
        }
    }

    /// Reset the bus, returning false if SDA or SCL are stuck low afterwards
    /// (bus lockup or missing pull-ups)
    ///
    /// Needs to be called once before the bus is used.
    pub fn init(&mut self) -> bool {
        self.try_init().is_ok()
    }

    /// Reset the bus
    ///
    /// Clocks SCL enough times to walk any slave left mid-byte through the rest
    /// of its transfer, then issues a stop.
    pub fn try_init(&mut self) -> Result<(), Error> {
        self.scl.set_low(&mut self.platform);
        self.sda.set_low(&mut self.platform);
        self.scl.clear_latch(&mut self.platform);
        self.sda.clear_latch(&mut self.platform);
        self.sda.set_high(&mut self.platform);
        self.delay();

        for _ in 0..self.config.recovery_pulses {
            self.scl.set_low(&mut self.platform);
            self.delay();
            self.scl.set_high(&mut self.platform);
            self.delay();
        }
        self.stop();

        let sda = self.sda.read(&mut self.platform);
        let scl = self.scl.read(&mut self.platform);

        if sda == PinState::Low || scl == PinState::Low {
            warn!(
                "bus lockup: sda high={}, scl high={}",
                sda == PinState::High,
                scl == PinState::High
            );
            return Err(Error::BusLockup);
        }

        debug!("bus initialised");
        Ok(())
    }

    /// Send a start condition followed by `address` (8-bit, R/W included),
    /// returning true if the slave acknowledged
    pub fn start(&mut self, address: u8) -> bool {
        self.try_start(address).is_ok()
    }

    /// Send a start condition followed by `address` (8-bit, R/W included)
    pub fn try_start(&mut self, address: u8) -> Result<(), Error> {
        if !self.scl.is_released() {
            if self.sda.is_released() {
                self.delay();
                self.scl.set_high(&mut self.platform);
            } else {
                self.delay();
                self.sda.set_high(&mut self.platform);
                self.delay();
                self.scl.set_high(&mut self.platform);
            }
        }

        self.delay();
        // SDA falling while SCL is high
        self.sda.set_low(&mut self.platform);
        self.delay();
        self.scl.set_low(&mut self.platform);

        self.try_write(address).map_err(|error| match error {
            Error::NoAcknowledge(_) => Error::NoAcknowledge(Nack::Address),
            other => other,
        })
    }

    /// Address a slave again without releasing the bus first
    pub fn repeated_start(&mut self, address: u8) -> bool {
        self.start(address)
    }

    /// Address a slave again without releasing the bus first
    ///
    /// The line state tracking in [`SoftI2c::try_start`] already brings the
    /// bus back to a state where a start condition can be generated.
    pub fn try_repeated_start(&mut self, address: u8) -> Result<(), Error> {
        self.try_start(address)
    }

    /// Send a stop condition, releasing the bus
    pub fn stop(&mut self) {
        if self.sda.is_released() {
            if self.scl.is_released() {
                self.scl.set_low(&mut self.platform);
                self.delay();
            }
            self.sda.set_low(&mut self.platform);
            self.delay();
        }
        if !self.scl.is_released() {
            self.scl.set_high(&mut self.platform);
            self.delay();
        }
        // SDA rising while SCL is high
        self.sda.set_high(&mut self.platform);
        self.platform.delay_us(self.config.delay_us().saturating_mul(2));
    }

    pub(crate) fn delay(&mut self) {
        self.platform.delay_us(self.config.delay_us());
    }

    pub(crate) fn half_delay(&mut self) {
        self.platform.delay_us(self.config.half_delay_us());
    }
}
