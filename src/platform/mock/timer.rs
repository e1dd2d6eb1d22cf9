//! Mock Timer implementation for testing

use crate::platform::{traits::TimerInterface, Result};
use core::cell::Cell;

/// Mock Timer implementation
///
/// Delays advance a simulated clock instantly, so bounded wait loops finish
/// deterministically in tests.
#[derive(Debug, Default)]
pub struct MockTimer {
    now_us: Cell<u64>,
    delay_count: Cell<u32>,
}

impl MockTimer {
    /// Create a new mock timer at time 0
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance the simulated clock without counting a delay
    pub fn advance_ms(&self, ms: u64) {
        self.now_us.set(self.now_us.get() + ms * 1000);
    }

    /// Number of delay calls made so far
    pub fn delay_count(&self) -> u32 {
        self.delay_count.get()
    }
}

impl TimerInterface for MockTimer {
    fn delay_us(&mut self, us: u32) -> Result<()> {
        self.now_us.set(self.now_us.get().wrapping_add(us as u64));
        self.delay_count.set(self.delay_count.get() + 1);
        Ok(())
    }

    fn delay_ms(&mut self, ms: u32) -> Result<()> {
        self.delay_us(ms.saturating_mul(1000))
    }

    fn now_us(&self) -> u64 {
        self.now_us.get()
    }
}
