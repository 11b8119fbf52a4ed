use crate::port::{Edge, PulseTimer, TimerEvent};
use onewire_core::RomId;
use onewire_core::consts::{ONEWIRE_READ_ROM_CMD, ONEWIRE_READ_ROM_LEGACY_CMD, ONEWIRE_SEARCH_CMD};

/// Tick count at which capture timestamps wrap, 2^15 ticks of 1 µs.
pub const TICK_WRAP: u16 = 32768;

/// Reset window, exclusive on both ends: a low pulse strictly inside
/// (460, 550) µs is a bus reset. Wider is a host gone quiet, narrower is
/// data or noise.
const RESET_MIN_TICKS: u16 = 460;
const RESET_MAX_TICKS: u16 = 550;

/// Presence answer: wait 18 µs after the reset release, drive 150 µs.
const PRESENCE_DELAY_TICKS: u16 = 18;
const PRESENCE_WIDTH_TICKS: u16 = 150;

/// Width of every data answer pulse the key transmits.
const RESPONSE_WIDTH_TICKS: u16 = 30;

/// Anything at or below this is contact bounce, not a slot.
const GLITCH_TICKS: u16 = 1;
/// Host low widths strictly inside (1, 30) µs encode a one...
const WRITE_ONE_MAX_TICKS: u16 = 30;
/// ...and strictly inside (40, 120) µs encode a zero.
const WRITE_ZERO_MIN_TICKS: u16 = 40;
const WRITE_ZERO_MAX_TICKS: u16 = 120;

/// A host read slot opens with a low pulse strictly inside (1, 15) µs.
const READ_SLOT_MAX_TICKS: u16 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Ignore everything but a reset pulse.
    Idle,
    /// Assemble the command byte from host write slots.
    Command,
    /// Transmit the 64 identifier bits.
    ReadRom,
    /// Answer bit/complement/direction triplets.
    SearchRom,
}

/// Interrupt-resident DS1990A key.
///
/// Owns no hardware. The platform's capture/compare ISR forwards each
/// [`TimerEvent`] here together with its [`PulseTimer`], and the emulator
/// answers by scheduling response pulses. Every call does a bounded amount
/// of work and never blocks, so it is safe at capture-interrupt priority.
///
/// The identifier is borrowed for the whole emulation session;
/// [`activate`](Self::activate) publishes it and
/// [`deactivate`](Self::deactivate) releases it. Events arriving without a
/// published identifier (a stale interrupt during teardown) are dropped.
#[derive(Debug)]
pub struct KeyEmulator<'k> {
    rom: Option<&'k RomId>,
    phase: Phase,
    last_stamp: u16,
    bits: u16,
    command: u8,
}

impl<'k> Default for KeyEmulator<'k> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'k> KeyEmulator<'k> {
    /// Create an inactive emulator.
    pub const fn new() -> Self {
        Self {
            rom: None,
            phase: Phase::Idle,
            last_stamp: 0,
            bits: 0,
            command: 0,
        }
    }

    /// Publish the identifier to present and start listening for a reset.
    pub fn activate(&mut self, rom: &'k RomId) {
        self.rom = Some(rom);
        self.phase = Phase::Idle;
        self.last_stamp = 0;
        self.bits = 0;
        self.command = 0;
    }

    /// Release the identifier. Subsequent events are ignored.
    pub fn deactivate(&mut self) {
        self.rom = None;
        self.phase = Phase::Idle;
    }

    /// Whether an identifier is currently published.
    pub fn is_active(&self) -> bool {
        self.rom.is_some()
    }

    /// The currently published identifier, if any.
    pub fn rom(&self) -> Option<&'k RomId> {
        self.rom
    }

    /// Feed one event from the capture/compare ISR.
    pub fn handle<T: PulseTimer>(&mut self, event: TimerEvent, timer: &mut T) {
        let Some(rom) = self.rom else {
            return;
        };
        match event {
            TimerEvent::EndOfPulse => timer.arm_capture(),
            TimerEvent::InputCapture(stamp, edge) => self.on_edge(stamp, edge, rom, timer),
        }
    }

    fn on_edge<T: PulseTimer>(&mut self, stamp: u16, edge: Edge, rom: &RomId, timer: &mut T) {
        let width = stamp.wrapping_sub(self.last_stamp) & (TICK_WRAP - 1);
        self.last_stamp = stamp;

        // A falling capture closes a high gap: recovery time, or the
        // master's post-reset tail, which is as long as the reset pulse
        // itself. Gaps carry no data; only low-pulse widths are judged.
        if edge == Edge::Falling {
            return;
        }

        if width > RESET_MIN_TICKS && width < RESET_MAX_TICKS {
            // Bus reset: fresh frame, answer presence. The reset width
            // then runs through the phase logic itself, where it matches
            // no data window.
            self.phase = Phase::Command;
            self.bits = 0;
            self.command = 0;
            timer.schedule_pulse(PRESENCE_DELAY_TICKS, PRESENCE_WIDTH_TICKS);
        }

        match self.phase {
            Phase::Idle => {}
            Phase::Command => self.on_command_slot(width),
            Phase::ReadRom => self.on_read_slot(width, rom, timer),
            Phase::SearchRom => self.on_search_slot(width, rom, timer),
        }
    }

    fn on_command_slot(&mut self, width: u16) {
        if width > GLITCH_TICKS && width < WRITE_ONE_MAX_TICKS {
            self.command |= 1 << self.bits;
            self.bits += 1;
        } else if width > WRITE_ZERO_MIN_TICKS && width < WRITE_ZERO_MAX_TICKS {
            // Zero bits need no store, the byte assembles over cleared bits.
            self.bits += 1;
        } else {
            return;
        }
        if self.bits == 8 {
            self.bits = 0;
            match self.command {
                ONEWIRE_READ_ROM_CMD | ONEWIRE_READ_ROM_LEGACY_CMD => self.phase = Phase::ReadRom,
                ONEWIRE_SEARCH_CMD => self.phase = Phase::SearchRom,
                // Unknown opcode: keep listening for the next byte.
                _ => self.command = 0,
            }
        }
    }

    fn on_read_slot<T: PulseTimer>(&mut self, width: u16, rom: &RomId, timer: &mut T) {
        if width <= GLITCH_TICKS || width >= READ_SLOT_MAX_TICKS {
            return;
        }
        if !rom.bit(self.bits as usize) {
            // Zero bits are driven low; one bits leave the line floating.
            timer.schedule_pulse(0, RESPONSE_WIDTH_TICKS);
        }
        self.bits += 1;
        if self.bits == 64 {
            self.phase = Phase::Idle;
        }
    }

    fn on_search_slot<T: PulseTimer>(&mut self, width: u16, rom: &RomId, timer: &mut T) {
        let bit = rom.bit((self.bits / 3) as usize);
        match self.bits % 3 {
            0 => {
                if !bit {
                    timer.schedule_pulse(0, RESPONSE_WIDTH_TICKS);
                }
            }
            1 => {
                // Complement slot.
                if bit {
                    timer.schedule_pulse(0, RESPONSE_WIDTH_TICKS);
                }
            }
            _ => {
                let host_bit = width > GLITCH_TICKS && width < WRITE_ONE_MAX_TICKS;
                if host_bit != bit {
                    // Host went down the other branch; stay quiet until the
                    // next reset.
                    self.phase = Phase::Idle;
                    return;
                }
            }
        }
        self.bits += 1;
        if self.bits == 192 {
            self.phase = Phase::Idle;
        }
    }
}
