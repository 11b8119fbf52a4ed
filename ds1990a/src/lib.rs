#![no_std]
//! # ds1990a
//! An engine for the DS1990A serial-number iButton on a single probe pin:
//! read a touched key through any [`OneWireMaster`](onewire_core::OneWireMaster)
//! implementation, or present one behind a capture/compare timer channel,
//! one role at a time.
//!
//! The [`KeyReader`] polls a bus master for a key and fills a caller-owned
//! [`RomId`](onewire_core::RomId). The [`KeyEmulator`] answers Read ROM and
//! Search ROM from interrupt context, driven by [`TimerEvent`]s from a
//! platform timer exposed through the [`PulseTimer`] capability. The
//! [`ModeController`] switches the shared pin between the two roles.

mod control;
mod controller;
mod emulator;
mod port;
mod reader;
mod reader_async;

pub use control::{ControlMailbox, ControlMessage, IButtonMode, ReaderEvent};
pub use controller::ModeController;
pub use emulator::{KeyEmulator, TICK_WRAP};
pub use port::{Edge, OneWirePort, PulseTimer, TimerEvent};
pub use reader::{KeyReader, POLL_INTERVAL_US};

/// 1-Wire family code of the DS1990A serial number iButton.
pub const FAMILY_CODE: u8 = 0x01;
