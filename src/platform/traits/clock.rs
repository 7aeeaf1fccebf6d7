//! Monotonic clock

/// Millisecond clock interface
///
/// Timeouts in the control core are polled against this clock each loop
/// iteration; no callback timers exist.
pub trait ClockInterface {
    /// Milliseconds since boot (wrapping)
    fn now_ms(&self) -> u32;

    /// Blocking delay
    fn delay_ms(&self, ms: u32);
}
