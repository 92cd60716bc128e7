//! Clock stretch monitor
//!
//! A slave may hold SCL low after the master releases it. Short stretches are
//! busy-polled for the quickest possible response, longer ones are polled once
//! per millisecond so other work can run, and past the timeout the transfer is
//! abandoned.

use crate::{config::Config, error::Error, line::Line, platform::Platform, Duration, Instant};

/// Phase of a clock stretch wait at a given instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StretchPhase {
    /// Poll SCL as fast as possible
    BusyWait,
    /// Sleep 1 ms between polls
    Yielding,
    /// Give up
    TimedOut,
}

/// Deadlines of a single clock stretch wait
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StretchTimeout {
    busy_until: Instant,
    expiry: Instant,
}

impl StretchTimeout {
    /// Start a wait at `now`
    pub fn start(now: Instant, busy_wait: Duration, timeout: Duration) -> Self {
        let busy_until = now + busy_wait;

        Self {
            busy_until,
            expiry: busy_until + timeout,
        }
    }

    /// Start a wait using the deadlines from a bus config
    pub fn from_config(now: Instant, config: &Config) -> Self {
        Self::start(now, config.busy_wait, config.stretch_timeout)
    }

    /// Which phase the wait is in at `now`
    pub fn phase(&self, now: Instant) -> StretchPhase {
        if now < self.busy_until {
            StretchPhase::BusyWait
        } else if now < self.expiry {
            StretchPhase::Yielding
        } else {
            StretchPhase::TimedOut
        }
    }

    /// Instant the wait gives up at
    pub fn expiry(&self) -> Instant {
        self.expiry
    }
}

/// Block until SCL reads high
pub(crate) fn wait_for_scl<P: Platform>(
    platform: &mut P,
    scl: &Line<P::Pin>,
    config: &Config,
) -> Result<(), Error> {
    if !scl.is_low(platform) {
        return Ok(());
    }

    let timeout = StretchTimeout::from_config(platform.now(), config);
    let mut yielding = false;

    while scl.is_low(platform) {
        match timeout.phase(platform.now()) {
            StretchPhase::BusyWait => (),
            StretchPhase::Yielding => {
                if !yielding {
                    trace!("clock stretched past busy wait, yielding");
                    yielding = true;
                }
                platform.delay_ms(1);
            }
            StretchPhase::TimedOut => {
                warn!("clock stretch timeout");
                return Err(Error::ClockStretchTimeout);
            }
        }
    }

    Ok(())
}
