/// Direction of a captured line edge.
///
/// A rising capture closes a low pulse, so the width since the previous
/// edge is time somebody drove the line; a falling capture closes a high
/// gap, recovery time in which the line just floated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    /// The line was pulled low.
    Falling,
    /// The line was released back high.
    Rising,
}

/// One hardware timer notification forwarded to the emulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TimerEvent {
    /// An input capture fired on a line edge. Carries the captured counter
    /// value in 1 µs ticks, wrapping at [`TICK_WRAP`](crate::TICK_WRAP),
    /// and which way the line moved; channels capturing both edges report
    /// the polarity of the edge that fired.
    InputCapture(u16, Edge),
    /// A pulse scheduled with [`PulseTimer::schedule_pulse`] has finished
    /// and the line is released again.
    EndOfPulse,
}

/// Timer operations the emulator invokes from capture-interrupt context.
///
/// Implementations must be O(1) register pokes: these run inside the ISR
/// between bus edges that can be under ten microseconds apart.
pub trait PulseTimer {
    /// Schedule a single low pulse on the line: wait `delay` ticks, drive
    /// low for `width` ticks, release, then deliver
    /// [`TimerEvent::EndOfPulse`]. Capture stays off until re-armed.
    fn schedule_pulse(&mut self, delay: u16, width: u16);

    /// Enable edge capture (again). Delivery of
    /// [`TimerEvent::InputCapture`] starts from the next line edge.
    fn arm_capture(&mut self);
}

/// Full control surface of the shared pad and its timer channel, used by
/// the mode controller when switching roles.
///
/// All operations must tolerate being called redundantly; the controller
/// leans on that when tearing down whatever came before.
pub trait OneWirePort: PulseTimer {
    /// Mux the pad to plain open-drain GPIO for bit-banged mastering.
    fn configure_gpio(&mut self);

    /// Mux the pad to the timer channel for emulation.
    fn configure_timer(&mut self);

    /// Route capture/compare interrupts to the emulator context.
    fn attach_capture(&mut self);

    /// Stop routing interrupts to the emulator context.
    fn detach_capture(&mut self);

    /// Halt the timer and cancel any scheduled pulse.
    fn stop(&mut self);
}
