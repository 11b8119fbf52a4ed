#![allow(async_fn_in_trait)]
use crate::{OneWireError, OneWireResult, RomId, consts::ONEWIRE_READ_ROM_CMD};

/// Trait for mastering a 1-Wire bus in async environments.
/// The asynchronous twin of [`OneWireMaster`](crate::OneWireMaster): the
/// same required bit-level operations and the same LSB-first byte defaults,
/// with every method `async`.
pub trait OneWireMasterAsync {
    /// The error type returned by the operations of this trait.
    /// This type is used to indicate errors in the underlying hardware or communication.
    type BusError;

    /// Resets the 1-Wire bus and samples the presence pulse.
    ///
    /// # Returns
    /// `true` if at least one slave answered the reset with a presence
    /// pulse, `false` on an empty (or stuck) bus.
    ///
    /// # Errors
    /// This method returns an error if the underlying hardware fails.
    async fn reset(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a single bit to the 1-Wire bus.
    /// # Arguments
    /// * `bit` - The bit to write.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    async fn write_bit(&mut self, bit: bool) -> OneWireResult<(), Self::BusError>;

    /// Reads a single bit from the 1-Wire bus.
    /// # Returns
    /// The bit read from the bus.
    /// # Errors
    /// This method returns an error if the read operation fails.
    async fn read_bit(&mut self) -> OneWireResult<bool, Self::BusError>;

    /// Writes a byte to the 1-Wire bus, LSB first.
    /// # Arguments
    /// * `byte` - The byte to write to the bus.
    ///
    /// # Errors
    /// This method returns an error if the write operation fails.
    async fn write_byte(&mut self, byte: u8) -> OneWireResult<(), Self::BusError> {
        for index in 0..8 {
            self.write_bit(byte & (1 << index) != 0).await?;
        }
        Ok(())
    }

    /// Reads a byte from the 1-Wire bus, LSB first.
    /// # Returns
    /// Byte read from the bus.
    ///
    /// # Errors
    /// This method returns an error if the read operation fails.
    async fn read_byte(&mut self) -> OneWireResult<u8, Self::BusError> {
        let mut byte = 0;
        for index in 0..8 {
            if self.read_bit().await? {
                byte |= 1 << index;
            }
        }
        Ok(byte)
    }

    /// Writes a sequence of bytes to the 1-Wire bus.
    /// # Arguments
    /// * `bytes` - The bytes to write.
    ///
    /// # Errors
    /// This method returns an error if any write operation fails.
    async fn write_bytes(&mut self, bytes: &[u8]) -> OneWireResult<(), Self::BusError> {
        for &byte in bytes.iter() {
            self.write_byte(byte).await?;
        }
        Ok(())
    }

    /// Reads bytes from the 1-Wire bus into a buffer.
    /// # Arguments
    /// * `buffer` - Filled with the bytes read, in bus order.
    ///
    /// # Errors
    /// This method returns an error if any read operation fails.
    async fn read_bytes(&mut self, buffer: &mut [u8]) -> OneWireResult<(), Self::BusError> {
        for byte in buffer.iter_mut() {
            *byte = self.read_byte().await?;
        }
        Ok(())
    }

    /// Reads the ROM identifier of the single slave on the bus.
    ///
    /// Issues a bus reset followed by the Read ROM command and shifts in the
    /// 8-byte identifier. Only valid on a single-drop bus; with multiple
    /// slaves the wired-AND of their responses arrives instead.
    ///
    /// # Returns
    /// The identifier read from the bus, CRC checked.
    ///
    /// # Errors
    /// [`OneWireError::NoDevicePresent`] if no slave answers the reset, and
    /// [`OneWireError::InvalidRomCrc`] if the identifier fails its CRC.
    async fn read_rom(&mut self) -> OneWireResult<RomId, Self::BusError> {
        if !self.reset().await? {
            return Err(OneWireError::NoDevicePresent);
        }
        self.write_byte(ONEWIRE_READ_ROM_CMD).await?;
        let mut bytes = [0u8; 8];
        self.read_bytes(&mut bytes).await?;
        let rom = RomId::new(bytes);
        if !rom.is_valid() {
            return Err(OneWireError::InvalidRomCrc);
        }
        Ok(rom)
    }
}
