//! Mock clock for testing

use core::cell::Cell;

use crate::platform::traits::ClockInterface;

/// Manually advanced millisecond clock
///
/// `delay_ms` advances the clock instead of sleeping, so blocking control
/// paths run instantly under test while timeout arithmetic stays real.
#[derive(Debug, Default)]
pub struct MockClock {
    now: Cell<u32>,
}

impl MockClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_now(&self, now_ms: u32) {
        self.now.set(now_ms);
    }

    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl ClockInterface for MockClock {
    fn now_ms(&self) -> u32 {
        self.now.get()
    }

    fn delay_ms(&self, ms: u32) {
        self.advance(ms);
    }
}
