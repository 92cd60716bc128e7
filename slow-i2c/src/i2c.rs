//! embedded-hal I2C master implementation
//!
//! [`SoftI2c`] has inherent byte-level `read`/`write` methods, so the trait's
//! buffer-level methods need to be called as `I2c::write(&mut bus, ..)`.

use {
    crate::{address::AddressByte, bus::SoftI2c, error::Error, platform::Platform},
    embedded_hal::i2c::{ErrorType, I2c, Operation, SevenBitAddress},
};

impl<P: Platform> SoftI2c<P> {
    fn read_from_slave(&mut self, input: &mut [u8], nack_last: bool) -> Result<(), Error> {
        let last_index = input.len().saturating_sub(1);
        for (i, byte) in input.iter_mut().enumerate() {
            *byte = self.try_read(nack_last && i == last_index)?;
        }
        Ok(())
    }

    fn write_to_slave(&mut self, output: &[u8]) -> Result<(), Error> {
        for byte in output {
            self.try_write(*byte)?;
        }
        Ok(())
    }

    fn run_operations(
        &mut self,
        address: AddressByte,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Error> {
        let mut last_was_read = None;

        for index in 0..operations.len() {
            let next_is_read = operations[index + 1..]
                .iter()
                .find(|op| !is_empty_read(op))
                .is_some_and(|op| matches!(op, Operation::Read(_)));

            match &mut operations[index] {
                // nothing to clock in, and addressing the slave for a read
                // would leave it driving SDA
                Operation::Read(buf) if buf.is_empty() => (),
                Operation::Read(buf) => {
                    // ST or SR + SAD+R between operations of different kind
                    if last_was_read != Some(true) {
                        self.try_start(address.with_is_read(true).into())?;
                    }

                    // the master does not acknowledge the final byte of a read run
                    self.read_from_slave(buf, !next_is_read)?;

                    last_was_read = Some(true);
                }
                Operation::Write(buf) => {
                    if last_was_read != Some(false) {
                        self.try_start(address.with_is_read(false).into())?;
                    }

                    self.write_to_slave(buf)?;

                    last_was_read = Some(false);
                }
            }
        }

        Ok(())
    }
}

fn is_empty_read(operation: &Operation<'_>) -> bool {
    matches!(operation, Operation::Read(buf) if buf.is_empty())
}

impl<P: Platform> ErrorType for SoftI2c<P> {
    type Error = Error;
}

impl<P: Platform> I2c<SevenBitAddress> for SoftI2c<P> {
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if operations.is_empty() {
            return Ok(());
        }

        let address = AddressByte::for_write(address)?;

        let result = self.run_operations(address, operations);

        // SP, also after a failure so the bus is left released
        self.stop();

        result
    }
}
