use crate::control::{ControlMessage, IButtonMode, ReaderEvent};
use onewire_core::{OneWireMaster, OneWireResult, consts::ONEWIRE_READ_ROM_CMD};

/// Interval between read attempts while the reader is enabled.
pub const POLL_INTERVAL_US: u32 = 50_000;

/// Polls a probe for a touched key and captures its identifier.
///
/// The reader owns no bus: every [`poll`](Self::poll) borrows a
/// [`OneWireMaster`] for one complete attempt, so the pin can serve other
/// roles between polls. While disabled, the driving task is expected to
/// block on the control mailbox instead of calling `poll` at all.
#[derive(Debug, Default)]
pub struct KeyReader<'k> {
    pub(crate) dest: Option<&'k mut onewire_core::RomId>,
    pub(crate) enabled: bool,
}

impl<'k> KeyReader<'k> {
    /// Create a disabled reader.
    pub const fn new() -> Self {
        Self {
            dest: None,
            enabled: false,
        }
    }

    /// Apply a control message, replacing the destination buffer and the
    /// enabled flag in one step. A message of any mode other than
    /// [`IButtonMode::Read`] disables polling.
    pub fn control(&mut self, message: ControlMessage<'k>) {
        self.dest = message.rom;
        self.enabled = message.mode == IButtonMode::Read && self.dest.is_some();
    }

    /// Whether the reader currently wants to be polled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// One read attempt: bus reset, presence gate, Read ROM, 8 bytes into
    /// the destination.
    ///
    /// Every attempt starts from scratch; a key yanked off the probe mid
    /// read costs nothing but this attempt. On success the reader disables
    /// itself and releases the destination, so one touch produces exactly
    /// one [`ReaderEvent::KeyPresent`].
    ///
    /// # Errors
    /// Transport errors propagate; a missing key is `Ok(None)`, not an
    /// error.
    pub fn poll<B: OneWireMaster>(
        &mut self,
        bus: &mut B,
    ) -> OneWireResult<Option<ReaderEvent>, B::BusError> {
        let Some(dest) = self.dest.as_mut() else {
            return Ok(None);
        };
        if !self.enabled {
            return Ok(None);
        }
        if !bus.reset()? {
            return Ok(None);
        }
        bus.write_byte(ONEWIRE_READ_ROM_CMD)?;
        bus.read_bytes(dest.as_bytes_mut())?;
        self.enabled = false;
        self.dest = None;
        Ok(Some(ReaderEvent::KeyPresent))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::control::{ControlMailbox, ControlMessage, IButtonMode, ReaderEvent};
    use core::convert::Infallible;
    use onewire_core::{OneWireMaster, OneWireResult, RomId};

    /// A bus with (or without) one scripted key on it.
    struct FakeBus {
        presence: bool,
        rom: RomId,
        resets: usize,
        bits_served: usize,
        command_bits: usize,
    }

    impl FakeBus {
        fn new(presence: bool, rom: RomId) -> Self {
            Self {
                presence,
                rom,
                resets: 0,
                bits_served: 0,
                command_bits: 0,
            }
        }
    }

    impl OneWireMaster for FakeBus {
        type BusError = Infallible;

        fn reset(&mut self) -> OneWireResult<bool, Infallible> {
            self.resets += 1;
            self.bits_served = 0;
            self.command_bits = 0;
            Ok(self.presence)
        }

        fn write_bit(&mut self, _bit: bool) -> OneWireResult<(), Infallible> {
            self.command_bits += 1;
            Ok(())
        }

        fn read_bit(&mut self) -> OneWireResult<bool, Infallible> {
            let bit = self.rom.bit(self.bits_served % 64);
            self.bits_served += 1;
            Ok(bit)
        }
    }

    #[test]
    fn disabled_reader_leaves_the_bus_alone() {
        let mut bus = FakeBus::new(true, RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]));
        let mut reader = KeyReader::new();
        assert_eq!(reader.poll(&mut bus).unwrap(), None);
        assert_eq!(bus.resets, 0);
    }

    #[test]
    fn one_touch_one_event() {
        let rom = RomId::from_serial(0x01, [0xca, 0xfe, 0x00, 0x01, 0x02, 0x03]);
        let mut bus = FakeBus::new(true, rom);
        let mut dest = RomId::default();
        let mut reader = KeyReader::new();
        reader.control(ControlMessage::read(&mut dest));
        assert!(reader.is_enabled());
        assert_eq!(reader.poll(&mut bus).unwrap(), Some(ReaderEvent::KeyPresent));
        assert!(!reader.is_enabled());
        // The success consumed the destination: further polls are no-ops.
        assert_eq!(reader.poll(&mut bus).unwrap(), None);
        assert_eq!(bus.resets, 1);
        assert_eq!(bus.command_bits, 8);
        drop(reader);
        assert_eq!(dest, rom);
    }

    #[test]
    fn absent_key_keeps_polling() {
        let mut bus = FakeBus::new(false, RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]));
        let mut dest = RomId::default();
        let mut reader = KeyReader::new();
        reader.control(ControlMessage::read(&mut dest));
        for _ in 0..3 {
            assert_eq!(reader.poll(&mut bus).unwrap(), None);
            assert!(reader.is_enabled());
        }
        // Each attempt was a fresh reset, nothing carried over.
        assert_eq!(bus.resets, 3);
        // The key arrives on the fourth attempt.
        bus.presence = true;
        assert_eq!(reader.poll(&mut bus).unwrap(), Some(ReaderEvent::KeyPresent));
    }

    #[test]
    fn disable_stops_polling() {
        let mut bus = FakeBus::new(true, RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]));
        let mut dest = RomId::default();
        let mut reader = KeyReader::new();
        reader.control(ControlMessage::read(&mut dest));
        reader.control(ControlMessage::disabled());
        assert!(!reader.is_enabled());
        assert_eq!(reader.poll(&mut bus).unwrap(), None);
        assert_eq!(bus.resets, 0);
    }

    #[test]
    fn control_mailbox_keeps_only_the_latest_request() {
        let mut first = RomId::default();
        let mut second = RomId::default();
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        mailbox.signal(ControlMessage::read(&mut first));
        mailbox.signal(ControlMessage::disabled());
        mailbox.signal(ControlMessage::read(&mut second));
        let message = mailbox.try_take().unwrap();
        assert_eq!(message.mode, IButtonMode::Read);
        assert!(mailbox.try_take().is_none());
        // The surviving request is the last one posted: it references
        // `second`, not `first`.
        let marker = RomId::from_serial(0x01, [9, 9, 9, 9, 9, 9]);
        *message.rom.unwrap() = marker;
        assert_eq!(second, marker);
        assert_eq!(first, RomId::default());
    }
}
