use crate::OneWireCrc;

/// A 64-bit 1-Wire ROM identifier.
///
/// Stored in wire order: family code first, then the 48-bit serial number
/// least-significant byte first, then the CRC-8 of the preceding 7 bytes.
/// This is also the order the bytes shift onto the bus, each byte LSB first.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RomId([u8; 8]);

impl RomId {
    /// Wrap an 8-byte ROM as read off the bus.
    pub const fn new(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Build a ROM from a family code and serial number, computing the CRC.
    ///
    /// # Arguments
    /// * `family` - The 8-bit device family code (0x01 for the DS1990A).
    /// * `serial` - The 48-bit serial number, least-significant byte first.
    pub fn from_serial(family: u8, serial: [u8; 6]) -> Self {
        let mut bytes = [0u8; 8];
        bytes[0] = family;
        bytes[1..7].copy_from_slice(&serial);
        bytes[7] = OneWireCrc::checksum(&bytes[..7]);
        Self(bytes)
    }

    /// Build a ROM from its 64-bit little-endian representation.
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw.to_le_bytes())
    }

    /// The 64-bit little-endian representation, family code in the low byte.
    pub const fn to_raw(self) -> u64 {
        u64::from_le_bytes(self.0)
    }

    /// The device family code.
    pub const fn family(&self) -> u8 {
        self.0[0]
    }

    /// The 48-bit serial number, least-significant byte first.
    pub fn serial(&self) -> &[u8] {
        &self.0[1..7]
    }

    /// The CRC-8 byte as stored.
    pub const fn crc(&self) -> u8 {
        self.0[7]
    }

    /// Whether the stored CRC matches the family code and serial number.
    pub fn is_valid(&self) -> bool {
        OneWireCrc::validate(&self.0)
    }

    /// Bit `index` of the identifier in transmission order: bit `index % 8`
    /// of byte `index / 8`, LSB first within each byte.
    ///
    /// `index` must be below 64.
    pub const fn bit(&self, index: usize) -> bool {
        debug_assert!(index < 64);
        (self.0[index / 8] >> (index % 8)) & 0x1 == 0x1
    }

    /// Borrow the raw bytes in wire order.
    pub const fn as_bytes(&self) -> &[u8; 8] {
        &self.0
    }

    /// Borrow the raw bytes mutably, for reading an identifier in place.
    pub fn as_bytes_mut(&mut self) -> &mut [u8; 8] {
        &mut self.0
    }
}

impl From<[u8; 8]> for RomId {
    fn from(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }
}

impl From<RomId> for [u8; 8] {
    fn from(rom: RomId) -> Self {
        rom.0
    }
}

impl From<u64> for RomId {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

impl From<RomId> for u64 {
    fn from(rom: RomId) -> Self {
        rom.to_raw()
    }
}

impl core::fmt::Display for RomId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::RomId;
    use rand::Rng;
    use std::string::ToString;

    #[test]
    fn from_serial_is_valid() {
        let rom = RomId::from_serial(0x01, [0xef, 0xcd, 0xab, 0x89, 0x67, 0x45]);
        assert_eq!(rom.family(), 0x01);
        assert_eq!(rom.serial(), &[0xef, 0xcd, 0xab, 0x89, 0x67, 0x45]);
        assert!(rom.is_valid());
    }

    #[test]
    fn random_serials_are_valid() {
        let mut rng = rand::rng();
        for _ in 0..64 {
            let rom = RomId::from_serial(0x01, rng.random());
            assert!(rom.is_valid());
        }
    }

    #[test]
    fn bit_order_is_lsb_first_per_byte() {
        let rom = RomId::new([0x01, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
        assert!(rom.bit(0));
        assert!(!rom.bit(1));
        assert!(!rom.bit(8));
        assert!(rom.bit(15));
        assert!(!rom.bit(63));
    }

    #[test]
    fn raw_round_trip() {
        let rom = RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]);
        assert_eq!(RomId::from_raw(rom.to_raw()), rom);
        assert_eq!(rom.to_raw() & 0xff, 0x01);
    }

    #[test]
    fn display_is_colon_separated_hex() {
        let rom = RomId::new([0x01, 0x1c, 0xb8, 0x01, 0x00, 0x00, 0x00, 0xa2]);
        assert_eq!(rom.to_string(), "01:1c:b8:01:00:00:00:a2");
    }
}
