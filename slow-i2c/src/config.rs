//! Bus timing configuration

use {crate::Duration, fugit::MicrosDurationU32};

/// Protocol delay unit in microseconds
pub const DELAY_US: u32 = 4;

/// How long a stretched clock is busy-polled before the driver starts yielding
pub const BUSY_WAIT_MS: u64 = 2;

/// How long a stretched clock is waited for after the busy phase
pub const STRETCH_TIMEOUT_MS: u64 = 3000;

/// Number of SCL pulses `init` issues to flush a slave stuck mid-transfer
pub const RECOVERY_PULSES: u8 = 28;

/// Bus timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config {
    /// Delay between line transitions, halved for sampling phases
    pub bit_delay: MicrosDurationU32,
    /// Busy-poll phase of a clock stretch wait
    pub busy_wait: Duration,
    /// Yielding phase of a clock stretch wait, after which the wait gives up
    pub stretch_timeout: Duration,
    /// SCL pulses issued by `init`
    pub recovery_pulses: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl Config {
    /// Roughly 100 kHz on a fast core, slower on a slow one
    pub const STANDARD: Self = Self {
        bit_delay: MicrosDurationU32::from_ticks(DELAY_US),
        busy_wait: Duration::from_ticks(BUSY_WAIT_MS),
        stretch_timeout: Duration::from_ticks(STRETCH_TIMEOUT_MS),
        recovery_pulses: RECOVERY_PULSES,
    };

    /// Conservative timing for long wires or heavily loaded buses
    pub const SLOW: Self = Self {
        bit_delay: MicrosDurationU32::from_ticks(50),
        ..Self::STANDARD
    };

    pub const fn with_bit_delay(self, bit_delay: MicrosDurationU32) -> Self {
        Self { bit_delay, ..self }
    }

    pub const fn with_busy_wait(self, busy_wait: Duration) -> Self {
        Self { busy_wait, ..self }
    }

    pub const fn with_stretch_timeout(self, stretch_timeout: Duration) -> Self {
        Self {
            stretch_timeout,
            ..self
        }
    }

    pub const fn with_recovery_pulses(self, recovery_pulses: u8) -> Self {
        Self {
            recovery_pulses,
            ..self
        }
    }

    /// Full delay unit in microseconds
    pub(crate) fn delay_us(&self) -> u32 {
        self.bit_delay.ticks()
    }

    /// Half delay unit, used while sampling
    pub(crate) fn half_delay_us(&self) -> u32 {
        self.bit_delay.ticks() / 2
    }
}
