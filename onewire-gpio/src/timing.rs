//! Slot timing for standard-speed 1-Wire, in microseconds.
//!
//! These values are the field-proven set for touch-contact iButton probes,
//! slightly off the datasheet nominals on purpose: contact bounce eats
//! into the margins, and these have the slack where it matters.

/// Duration the master holds the line low to reset the bus.
pub const RESET_LOW_US: u32 = 480;
/// Delay from releasing the reset pulse to sampling for presence.
pub const RESET_SAMPLE_DELAY_US: u32 = 70;
/// Remainder of the reset high time after the presence sample.
pub const RESET_TAIL_US: u32 = 410;

/// Interval between probes while waiting for the bus to read high.
pub const WAIT_PROBE_INTERVAL_US: u32 = 2;
/// Default number of probes before the bus is declared held low.
pub const RESET_WAIT_RETRIES: u16 = 125;

/// Low time that opens a read slot.
pub const READ_INIT_LOW_US: u32 = 3;
/// Delay from releasing the slot to sampling the slave's response.
pub const READ_SAMPLE_DELAY_US: u32 = 10;
/// Remainder of the read slot after the sample.
pub const READ_TAIL_US: u32 = 53;

/// Low time of a write-one slot.
pub const WRITE_ONE_LOW_US: u32 = 10;
/// High time completing a write-one slot.
pub const WRITE_ONE_RELEASE_US: u32 = 55;
/// Low time of a write-zero slot.
pub const WRITE_ZERO_LOW_US: u32 = 65;
/// Recovery time after a write-zero slot.
pub const WRITE_ZERO_RELEASE_US: u32 = 5;
