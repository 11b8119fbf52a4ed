use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use onewire_core::RomId;

/// Which role currently owns the probe pin.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IButtonMode {
    /// Neither role drives the pin.
    #[default]
    Disabled,
    /// Poll the pin as a bus master looking for a touched key.
    Read,
    /// Answer as a DS1990A key from the timer channel.
    EmulateDallas,
}

/// A mode-change request, carrying the key buffer the new role works on.
///
/// The buffer is borrowed exclusively: the reader writes the captured
/// identifier through it, the emulator transmits from it. Holding the
/// `&mut` for the whole session is what keeps anyone from freeing or
/// rewriting the key while a role is using it.
#[derive(Debug)]
pub struct ControlMessage<'k> {
    /// The requested mode.
    pub mode: IButtonMode,
    /// The key buffer, absent for [`IButtonMode::Disabled`].
    pub rom: Option<&'k mut RomId>,
}

impl<'k> ControlMessage<'k> {
    /// Request polling for a key, captured into `rom`.
    pub fn read(rom: &'k mut RomId) -> Self {
        Self {
            mode: IButtonMode::Read,
            rom: Some(rom),
        }
    }

    /// Request emulating the key stored in `rom`.
    pub fn emulate(rom: &'k mut RomId) -> Self {
        Self {
            mode: IButtonMode::EmulateDallas,
            rom: Some(rom),
        }
    }

    /// Request releasing the pin.
    pub fn disabled() -> Self {
        Self {
            mode: IButtonMode::Disabled,
            rom: None,
        }
    }
}

/// Single-slot control mailbox.
///
/// A request posted before the previous one was consumed simply replaces
/// it; only the latest requested mode matters, so the stale request is
/// dropped rather than queued.
pub type ControlMailbox<'k> = Signal<CriticalSectionRawMutex, ControlMessage<'k>>;

/// Notification from the reader to the surrounding application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReaderEvent {
    /// A key touched the probe and its identifier was captured into the
    /// destination buffer.
    KeyPresent,
}
