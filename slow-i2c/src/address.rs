//! Address byte sent after a start condition

use {crate::error::Error, proc_bitfield::bitfield};

bitfield! {
    /// 7-bit slave address followed by the R/W bit
    #[derive(Clone, Copy, PartialEq, Eq)]
    pub struct AddressByte(pub u8): Debug, FromRaw, IntoRaw {
        /// 7-bit slave address
        pub address: u8 @ 1..=7,
        /// Master reads from the slave
        pub is_read: bool @ 0,
    }
}

impl AddressByte {
    /// Largest 7-bit address
    pub const MAX_ADDRESS: u8 = 0x7F;

    /// Address byte for a write to `address`
    pub fn for_write(address: u8) -> Result<Self, Error> {
        Self::new(address, false)
    }

    /// Address byte for a read from `address`
    pub fn for_read(address: u8) -> Result<Self, Error> {
        Self::new(address, true)
    }

    fn new(address: u8, is_read: bool) -> Result<Self, Error> {
        if address > Self::MAX_ADDRESS {
            return Err(Error::InvalidAddress);
        }

        Ok(Self(0).with_address(address).with_is_read(is_read))
    }
}
