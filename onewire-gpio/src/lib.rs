#![no_std]
#![deny(missing_docs)]

/*! # onewire-gpio
 *
 * Software 1-Wire bus master over a single open-drain GPIO.
 *
 * The pin must be configured open-drain (or simulated as such with an
 * external pull-up): "releasing" the bus is driving the output high and
 * letting the resistor pull the line up, so slaves can still yank it low.
 * All slot timing is busy-waited through the supplied delay; run with
 * interrupts that can tolerate being a few microseconds late, or bits
 * will be.
 */

pub use onewire_core::{OneWireError, OneWireMaster, OneWireMasterAsync, OneWireResult};
mod onewire;
mod onewire_async;
pub mod timing;

/// A software 1-Wire bus master over one open-drain GPIO.
///
/// Takes ownership of a pin implementing the [`InputPin`](embedded_hal::digital::InputPin)
/// and [`OutputPin`](embedded_hal::digital::OutputPin) traits and a timer
/// object implementing the [`DelayNs`](embedded_hal::delay::DelayNs) trait.
pub struct OneWireGpio<P, D> {
    pub(crate) pin: P,
    pub(crate) delay: D,
    pub(crate) wait_retries: u16,
}

impl<P, D> OneWireGpio<P, D> {
    /// Creates a new bus master over the given pin and delay.
    pub fn new(pin: P, delay: D) -> Self {
        OneWireGpio {
            pin,
            delay,
            wait_retries: timing::RESET_WAIT_RETRIES,
        }
    }

    /// Set the bus-release probe count.
    ///
    /// Before a reset pulse the line is probed at 2 µs intervals until it
    /// reads high; after this many probes the bus is declared held low and
    /// the reset reports an empty bus.
    pub fn with_wait_retries(mut self, retries: u16) -> Self {
        self.wait_retries = retries;
        self
    }

    /// Release the pin and delay, for handing the pin to another role.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }
}

/// A software 1-Wire bus master over one open-drain GPIO, for async
/// environments.
///
/// Identical to [`OneWireGpio`] except that slot pacing awaits an
/// [`embedded_hal_async::delay::DelayNs`] instead of spinning, so other
/// tasks can run between slots. Pin accesses themselves stay synchronous.
pub struct OneWireGpioAsync<P, D> {
    pub(crate) pin: P,
    pub(crate) delay: D,
    pub(crate) wait_retries: u16,
}

impl<P, D> OneWireGpioAsync<P, D> {
    /// Creates a new async bus master over the given pin and delay.
    pub fn new(pin: P, delay: D) -> Self {
        OneWireGpioAsync {
            pin,
            delay,
            wait_retries: timing::RESET_WAIT_RETRIES,
        }
    }

    /// Set the bus-release probe count.
    ///
    /// Before a reset pulse the line is probed at 2 µs intervals until it
    /// reads high; after this many probes the bus is declared held low and
    /// the reset reports an empty bus.
    pub fn with_wait_retries(mut self, retries: u16) -> Self {
        self.wait_retries = retries;
        self
    }

    /// Release the pin and delay, for handing the pin to another role.
    pub fn free(self) -> (P, D) {
        (self.pin, self.delay)
    }
}
