//! A virtual open-drain 1-Wire line with an emulated key attached.
//!
//! The master side talks to the wire through [`SimPin`] and [`SimDelay`],
//! which implement the embedded-hal traits; the delay is what advances
//! virtual time. The slave side is a real [`KeyEmulator`]: line edges are
//! time-stamped into capture events exactly as a capture/compare channel
//! would deliver them, and the response pulses it schedules drive the line
//! back. Wired-AND like the real thing: the line is high only while nobody
//! drives it low.

use std::cell::RefCell;
use std::convert::Infallible;
use std::rc::Rc;

use ds1990a::{Edge, KeyEmulator, PulseTimer, TICK_WRAP, TimerEvent};
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use onewire_core::RomId;

/// A scheduled slave drive window, in absolute virtual microseconds.
struct SlavePulse {
    start: u64,
    end: u64,
}

/// Collects what the emulator asked of its timer during one event.
#[derive(Default)]
struct PortShim {
    scheduled: Option<(u16, u16)>,
    armed: bool,
}

impl PulseTimer for PortShim {
    fn schedule_pulse(&mut self, delay: u16, width: u16) {
        self.scheduled = Some((delay, width));
    }

    fn arm_capture(&mut self) {
        self.armed = true;
    }
}

/// The shared line state.
pub struct Wire<'k> {
    now: u64,
    master_low: bool,
    line_high: bool,
    capture_armed: bool,
    pulse: Option<SlavePulse>,
    emulator: KeyEmulator<'k>,
    key: &'k RomId,
}

impl<'k> Wire<'k> {
    /// A wire with the given key touching the probe, plus the pin and
    /// delay handles the master side plugs into `OneWireGpio`.
    pub fn shared(key: &'k RomId) -> (SimPin<'k>, SimDelay<'k>, Rc<RefCell<Wire<'k>>>) {
        let mut emulator = KeyEmulator::new();
        emulator.activate(key);
        let wire = Rc::new(RefCell::new(Wire {
            now: 0,
            master_low: false,
            line_high: true,
            capture_armed: true,
            pulse: None,
            emulator,
            key,
        }));
        (SimPin(wire.clone()), SimDelay(wire.clone()), wire)
    }

    /// Touch the key to the probe or lift it off.
    pub fn set_key_present(&mut self, present: bool) {
        if present {
            self.emulator.activate(self.key);
        } else {
            self.emulator.deactivate();
        }
    }

    fn slave_driving(&self) -> bool {
        self.pulse
            .as_ref()
            .is_some_and(|p| self.now >= p.start && self.now < p.end)
    }

    fn level(&self) -> bool {
        !self.master_low && !self.slave_driving()
    }

    fn master_set(&mut self, low: bool) {
        self.master_low = low;
        self.sync_line();
    }

    /// Re-evaluate the line level and deliver a capture on any edge.
    fn sync_line(&mut self) {
        let level = self.level();
        if level == self.line_high {
            return;
        }
        self.line_high = level;
        if self.capture_armed {
            let stamp = (self.now % u64::from(TICK_WRAP)) as u16;
            let edge = if level { Edge::Rising } else { Edge::Falling };
            self.dispatch(TimerEvent::InputCapture(stamp, edge));
            // The capture may have scheduled an immediate response that
            // takes the line straight back down.
            self.sync_line();
        }
    }

    fn dispatch(&mut self, event: TimerEvent) {
        let mut shim = PortShim::default();
        self.emulator.handle(event, &mut shim);
        if let Some((delay, width)) = shim.scheduled {
            let start = self.now + u64::from(delay);
            self.pulse = Some(SlavePulse {
                start,
                end: start + u64::from(width),
            });
            // Output compare owns the channel until the pulse completes.
            self.capture_armed = false;
        }
        if shim.armed {
            self.capture_armed = true;
        }
    }

    /// Advance virtual time, stopping at every pulse boundary so the line
    /// edges land at their true instants.
    fn advance(&mut self, duration_us: u64) {
        let mut remaining = duration_us;
        while remaining > 0 {
            let step = match &self.pulse {
                Some(p) if p.start > self.now => (p.start - self.now).min(remaining),
                Some(p) if p.end > self.now => (p.end - self.now).min(remaining),
                _ => remaining,
            };
            self.now += step;
            remaining -= step;
            self.sync_line();
            if let Some(p) = &self.pulse {
                if self.now >= p.end {
                    self.pulse = None;
                    self.dispatch(TimerEvent::EndOfPulse);
                }
            }
        }
    }
}

/// The master's view of the line as a GPIO pin.
pub struct SimPin<'k>(Rc<RefCell<Wire<'k>>>);

impl ErrorType for SimPin<'_> {
    type Error = Infallible;
}

impl OutputPin for SimPin<'_> {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().master_set(true);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().master_set(false);
        Ok(())
    }
}

impl InputPin for SimPin<'_> {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.0.borrow().level())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.0.borrow().level())
    }
}

/// The master's delay source; waiting is what moves virtual time.
pub struct SimDelay<'k>(Rc<RefCell<Wire<'k>>>);

impl DelayNs for SimDelay<'_> {
    fn delay_ns(&mut self, ns: u32) {
        self.0.borrow_mut().advance(u64::from(ns) / 1_000);
    }
}

#[cfg(test)]
mod tests {
    use super::Wire;
    use ds1990a::{ControlMessage, KeyReader, ReaderEvent};
    use onewire_core::{OneWireMaster, RomId, consts::ONEWIRE_SEARCH_CMD};
    use onewire_gpio::OneWireGpio;

    #[test]
    fn master_reads_the_emulated_key_back() {
        let key = RomId::from_serial(0x01, [0xde, 0xad, 0xbe, 0xef, 0x01, 0x02]);
        let (pin, delay, _wire) = Wire::shared(&key);
        let mut bus = OneWireGpio::new(pin, delay);
        assert_eq!(bus.read_rom().unwrap(), key);
    }

    #[test]
    fn repeated_reads_stay_in_sync() {
        // Several frames back to back, enough virtual time for the capture
        // counter to wrap between them.
        let key = RomId::from_serial(0x01, [0x10, 0x32, 0x54, 0x76, 0x98, 0xba]);
        let (pin, delay, _wire) = Wire::shared(&key);
        let mut bus = OneWireGpio::new(pin, delay);
        for _ in 0..8 {
            assert_eq!(bus.read_rom().unwrap(), key);
        }
    }

    #[test]
    fn search_pass_recovers_the_key() {
        let key = RomId::from_serial(0x01, [0x3c, 0x81, 0x07, 0xe0, 0x55, 0x2a]);
        let (pin, delay, _wire) = Wire::shared(&key);
        let mut bus = OneWireGpio::new(pin, delay);
        assert!(bus.reset().unwrap());
        bus.write_byte(ONEWIRE_SEARCH_CMD).unwrap();
        let mut bytes = [0u8; 8];
        for index in 0..64 {
            let bit = bus.read_bit().unwrap();
            let complement = bus.read_bit().unwrap();
            assert!(bit != complement, "triplet {index} must be determinate");
            bus.write_bit(bit).unwrap();
            if bit {
                bytes[index / 8] |= 1 << (index % 8);
            }
        }
        assert_eq!(RomId::new(bytes), key);
    }

    #[test]
    fn reader_polls_until_the_key_is_touched() {
        let key = RomId::from_serial(0x01, [0x11, 0x22, 0x33, 0x44, 0x55, 0x66]);
        let (pin, delay, wire) = Wire::shared(&key);
        let mut bus = OneWireGpio::new(pin, delay);
        let mut dest = RomId::default();
        let mut reader = KeyReader::new();
        wire.borrow_mut().set_key_present(false);
        reader.control(ControlMessage::read(&mut dest));
        assert_eq!(reader.poll(&mut bus).unwrap(), None);
        assert_eq!(reader.poll(&mut bus).unwrap(), None);
        wire.borrow_mut().set_key_present(true);
        assert_eq!(
            reader.poll(&mut bus).unwrap(),
            Some(ReaderEvent::KeyPresent)
        );
        drop(reader);
        assert_eq!(dest, key);
        assert!(dest.is_valid());
    }
}
