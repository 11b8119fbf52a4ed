use crate::control::{ControlMessage, IButtonMode};
use crate::emulator::KeyEmulator;
use crate::port::OneWirePort;
use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::signal::Signal;

/// Switches the shared probe pin between its roles.
///
/// The controller holds nothing but the current mode; the port, the
/// emulator and the reader mailbox are borrowed per dispatch, so the
/// emulator can live wherever the capture ISR reaches it.
#[derive(Debug, Default)]
pub struct ModeController {
    mode: IButtonMode,
}

impl ModeController {
    /// Create a controller in [`IButtonMode::Disabled`].
    pub const fn new() -> Self {
        Self {
            mode: IButtonMode::Disabled,
        }
    }

    /// The most recently requested mode.
    pub fn mode(&self) -> IButtonMode {
        self.mode
    }

    /// Apply a mode-change request.
    ///
    /// An active emulation session is always torn down first, in strict
    /// order: capture interrupts detached, timer stopped, and only then the
    /// borrowed identifier released. Arming runs the opposite way: the
    /// identifier is published before capture is attached, so the first
    /// interrupt already finds it.
    ///
    /// Requests for [`IButtonMode::Read`] and [`IButtonMode::Disabled`] are
    /// forwarded to the reader mailbox; an emulation request is not, so
    /// applications switch roles through `Disabled` rather than jumping
    /// from an enabled reader straight to emulation.
    pub fn dispatch<'k, P, M>(
        &mut self,
        message: ControlMessage<'k>,
        port: &mut P,
        emulator: &mut KeyEmulator<'k>,
        reader_control: &Signal<M, ControlMessage<'k>>,
    ) where
        P: OneWirePort,
        M: RawMutex,
    {
        let was_emulating = self.mode == IButtonMode::EmulateDallas;
        self.mode = message.mode;
        match message.mode {
            IButtonMode::Read => {
                if was_emulating {
                    teardown(port, emulator);
                }
                port.configure_gpio();
                reader_control.signal(message);
            }
            IButtonMode::EmulateDallas => {
                if was_emulating {
                    teardown(port, emulator);
                }
                if let Some(rom) = message.rom {
                    port.configure_timer();
                    emulator.activate(rom);
                    port.attach_capture();
                    port.arm_capture();
                }
            }
            IButtonMode::Disabled => {
                teardown(port, emulator);
                reader_control.signal(message);
            }
        }
    }
}

/// Detach, stop, and only then drop the identifier the ISR was reading.
fn teardown<'k, P: OneWirePort>(port: &mut P, emulator: &mut KeyEmulator<'k>) {
    port.detach_capture();
    port.stop();
    emulator.deactivate();
}

#[cfg(test)]
mod tests {
    extern crate std;
    use super::*;
    use crate::control::{ControlMailbox, ControlMessage, IButtonMode};
    use crate::emulator::KeyEmulator;
    use crate::port::PulseTimer;
    use onewire_core::RomId;
    use std::vec::Vec;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Call {
        ConfigureGpio,
        ConfigureTimer,
        AttachCapture,
        DetachCapture,
        Stop,
        ArmCapture,
        Pulse,
    }

    #[derive(Default)]
    struct FakePort {
        calls: Vec<Call>,
    }

    impl PulseTimer for FakePort {
        fn schedule_pulse(&mut self, _delay: u16, _width: u16) {
            self.calls.push(Call::Pulse);
        }

        fn arm_capture(&mut self) {
            self.calls.push(Call::ArmCapture);
        }
    }

    impl OneWirePort for FakePort {
        fn configure_gpio(&mut self) {
            self.calls.push(Call::ConfigureGpio);
        }

        fn configure_timer(&mut self) {
            self.calls.push(Call::ConfigureTimer);
        }

        fn attach_capture(&mut self) {
            self.calls.push(Call::AttachCapture);
        }

        fn detach_capture(&mut self) {
            self.calls.push(Call::DetachCapture);
        }

        fn stop(&mut self) {
            self.calls.push(Call::Stop);
        }
    }

    #[test]
    fn read_configures_gpio_and_forwards() {
        let mut key = RomId::default();
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage::read(&mut key),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert_eq!(controller.mode(), IButtonMode::Read);
        assert_eq!(port.calls, [Call::ConfigureGpio]);
        let forwarded = mailbox.try_take().unwrap();
        assert_eq!(forwarded.mode, IButtonMode::Read);
        assert!(forwarded.rom.is_some());
    }

    #[test]
    fn emulate_publishes_then_arms() {
        let mut key = RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]);
        let expected = key;
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage::emulate(&mut key),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert_eq!(controller.mode(), IButtonMode::EmulateDallas);
        assert_eq!(
            port.calls,
            [Call::ConfigureTimer, Call::AttachCapture, Call::ArmCapture]
        );
        assert_eq!(emulator.rom().copied(), Some(expected));
        // Emulation requests are not forwarded to the reader.
        assert!(mailbox.try_take().is_none());
    }

    #[test]
    fn disable_tears_down_before_releasing_the_key() {
        let mut key = RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]);
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage::emulate(&mut key),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        port.calls.clear();
        controller.dispatch(
            ControlMessage::disabled(),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert_eq!(controller.mode(), IButtonMode::Disabled);
        assert_eq!(port.calls, [Call::DetachCapture, Call::Stop]);
        assert!(!emulator.is_active());
        assert_eq!(mailbox.try_take().unwrap().mode, IButtonMode::Disabled);
    }

    #[test]
    fn switching_to_read_tears_down_emulation() {
        let mut emulated = RomId::from_serial(0x01, [1, 2, 3, 4, 5, 6]);
        let mut dest = RomId::default();
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage::emulate(&mut emulated),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        port.calls.clear();
        controller.dispatch(
            ControlMessage::read(&mut dest),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert_eq!(
            port.calls,
            [Call::DetachCapture, Call::Stop, Call::ConfigureGpio]
        );
        assert!(!emulator.is_active());
        assert_eq!(mailbox.try_take().unwrap().mode, IButtonMode::Read);
    }

    #[test]
    fn replacing_the_emulated_key() {
        let mut first = RomId::from_serial(0x01, [1, 1, 1, 1, 1, 1]);
        let mut second = RomId::from_serial(0x01, [2, 2, 2, 2, 2, 2]);
        let replacement = second;
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage::emulate(&mut first),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        controller.dispatch(
            ControlMessage::emulate(&mut second),
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert_eq!(
            port.calls,
            [
                Call::ConfigureTimer,
                Call::AttachCapture,
                Call::ArmCapture,
                Call::DetachCapture,
                Call::Stop,
                Call::ConfigureTimer,
                Call::AttachCapture,
                Call::ArmCapture,
            ]
        );
        assert_eq!(emulator.rom().copied(), Some(replacement));
    }

    #[test]
    fn emulate_without_a_key_arms_nothing() {
        let mailbox: ControlMailbox<'_> = ControlMailbox::new();
        let mut port = FakePort::default();
        let mut emulator = KeyEmulator::new();
        let mut controller = ModeController::new();
        controller.dispatch(
            ControlMessage {
                mode: IButtonMode::EmulateDallas,
                rom: None,
            },
            &mut port,
            &mut emulator,
            &mailbox,
        );
        assert!(port.calls.is_empty());
        assert!(!emulator.is_active());
    }
}
