//! Bus errors and their embedded-hal error kinds

use embedded_hal::i2c::{ErrorKind, NoAcknowledgeSource};

/// Which byte was not acknowledged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Nack {
    /// Address byte sent after a (repeated) start
    Address,
    /// Data byte
    Data,
}

/// Bus error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// SDA or SCL still low after the recovery sequence, the bus is locked up
    /// or the pull-up resistors are missing
    BusLockup,
    /// Slave did not pull SDA low in the acknowledge slot
    NoAcknowledge(Nack),
    /// Slave held SCL low past the stretch timeout, the transfer was abandoned
    /// mid-byte and the bus needs a stop followed by a fresh start
    ClockStretchTimeout,
    /// Address does not fit in seven bits
    InvalidAddress,
}

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self {
            Error::BusLockup => ErrorKind::Bus,
            Error::NoAcknowledge(Nack::Address) => {
                ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)
            }
            Error::NoAcknowledge(Nack::Data) => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Data),
            Error::ClockStretchTimeout | Error::InvalidAddress => ErrorKind::Other,
        }
    }
}
