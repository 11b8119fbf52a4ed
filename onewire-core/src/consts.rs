//! ROM-level command bytes shared by bus masters and slave emulators.

/// The Read ROM command allows the bus master to read the
/// slave's 8-bit family code, unique 48-bit serial number, and
/// 8-bit CRC. This command can only be used if there is a single
/// slave on the bus. If more than one slave is present, a data
/// collision occurs when all slaves try to transmit at the same
/// time (open drain produces a wired-AND result).
pub const ONEWIRE_READ_ROM_CMD: u8 = 0x33;

/// Alternate opcode for the Read ROM command, retained from the
/// DS1990 (non-A) era. Later iButton devices answer both; hosts
/// written against the original part still issue this one.
pub const ONEWIRE_READ_ROM_LEGACY_CMD: u8 = 0x0f;

/// Command to search for devices on the 1-Wire bus.
/// The bus master repeats a three-slot sequence per ROM bit: the
/// slaves transmit the bit and its complement, then the master
/// writes the direction it chose; slaves whose bit disagrees drop
/// off until the next reset pulse.
pub const ONEWIRE_SEARCH_CMD: u8 = 0xf0;
