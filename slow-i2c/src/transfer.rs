//! Byte transfer, most significant bit first

use {
    crate::{
        bus::SoftI2c,
        error::{Error, Nack},
        platform::Platform,
        stretch::wait_for_scl,
    },
    embedded_hal::digital::PinState,
};

/// Value `read` returns when the clock stretch times out
pub const READ_TIMEOUT_SENTINEL: u8 = 0xFF;

impl<P: Platform> SoftI2c<P> {
    /// Write one byte to the addressed slave, returning true if it was
    /// acknowledged
    ///
    /// False is also returned when the slave stretched the clock past the
    /// timeout; use [`SoftI2c::try_write`] to tell the two apart.
    pub fn write(&mut self, value: u8) -> bool {
        self.try_write(value).is_ok()
    }

    /// Write one byte to the addressed slave
    pub fn try_write(&mut self, value: u8) -> Result<(), Error> {
        for bit in (0..8).rev() {
            if value & (1 << bit) != 0 {
                self.sda.set_high(&mut self.platform);
            } else {
                self.sda.set_low(&mut self.platform);
            }
            self.delay();
            self.scl.set_high(&mut self.platform);
            self.delay();

            self.wait_for_clock()?;

            self.scl.set_low(&mut self.platform);
        }

        // let the slave drive the acknowledge bit
        self.sda.set_high(&mut self.platform);
        self.delay();
        self.scl.set_high(&mut self.platform);
        self.half_delay();

        self.wait_for_clock()?;

        let ack = self.sda.read(&mut self.platform);

        self.scl.set_low(&mut self.platform);
        self.delay();

        match ack {
            PinState::Low => Ok(()),
            PinState::High => {
                debug!("byte {=u8:#x} not acknowledged", value);
                Err(Error::NoAcknowledge(Nack::Data))
            }
        }
    }

    /// Read one byte from the addressed slave
    ///
    /// If `last` is true the byte is not acknowledged, telling the slave to
    /// stop sending. Returns 0xFF if the slave stretched the clock past the
    /// timeout, which cannot be told apart from a genuine 0xFF byte; use
    /// [`SoftI2c::try_read`] where that matters.
    pub fn read(&mut self, last: bool) -> u8 {
        self.try_read(last).unwrap_or(READ_TIMEOUT_SENTINEL)
    }

    /// Read one byte from the addressed slave, acknowledging it unless `last`
    pub fn try_read(&mut self, last: bool) -> Result<u8, Error> {
        let mut value = 0u8;

        self.sda.set_high(&mut self.platform);
        self.delay();

        for _ in 0..8 {
            value <<= 1;
            self.scl.set_high(&mut self.platform);
            self.half_delay();

            self.wait_for_clock()?;

            if self.sda.read(&mut self.platform) == PinState::High {
                value |= 1;
            }

            self.scl.set_low(&mut self.platform);
            self.delay();
        }

        if last {
            self.sda.set_high(&mut self.platform);
        } else {
            self.sda.set_low(&mut self.platform);
        }

        self.scl.set_high(&mut self.platform);
        self.delay();

        self.wait_for_clock()?;

        self.scl.set_low(&mut self.platform);
        self.delay();

        Ok(value)
    }

    fn wait_for_clock(&mut self) -> Result<(), Error> {
        wait_for_scl(&mut self.platform, &self.scl, &self.config)
    }
}
