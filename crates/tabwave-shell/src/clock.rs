//! Time source for history timestamps

use std::cell::Cell;
use std::time::{SystemTime, UNIX_EPOCH};

/// Supplies the timestamp recorded with each history entry
pub trait Clock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> u64;
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Deterministic clock that advances by `step` on every read
#[derive(Debug)]
pub struct SteppingClock {
    next: Cell<u64>,
    step: u64,
}

impl SteppingClock {
    pub fn new(start: u64, step: u64) -> Self {
        Self {
            next: Cell::new(start),
            step,
        }
    }

    /// A clock that always reads `at`
    pub fn fixed(at: u64) -> Self {
        Self::new(at, 0)
    }
}

impl Clock for SteppingClock {
    fn now_millis(&self) -> u64 {
        let now = self.next.get();
        self.next.set(now.saturating_add(self.step));
        now
    }
}
