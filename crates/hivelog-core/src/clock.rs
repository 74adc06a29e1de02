//! Monotonic timestamp allocation.
//!
//! Wall clocks can stall or step backwards (NTP adjustments, coarse tick
//! granularity under rapid-fire calls). The allocator guarantees that the
//! `ts` sequence of a single emitter instance is strictly increasing anyway.

use std::time::{SystemTime, UNIX_EPOCH};

/// Allocates strictly increasing nanosecond epoch timestamps.
///
/// Monotonicity is per-instance only: independent processes writing to the
/// same partition are ordered merely by their own wall clocks.
#[derive(Debug, Default)]
pub struct MonotonicClock {
    last: u64,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a nanosecond epoch value strictly greater than every value
    /// this instance returned before.
    ///
    /// Never blocks and cannot fail: if the wall clock has not advanced
    /// past the last allocation, the result is `last + 1`.
    pub fn allocate(&mut self) -> u64 {
        self.allocate_from(wall_clock_ns())
    }

    /// Allocation against an explicit wall-clock reading.
    ///
    /// Useful for callers with their own time source; [`allocate`] is
    /// this applied to the system clock.
    ///
    /// [`allocate`]: MonotonicClock::allocate
    pub fn allocate_from(&mut self, now_ns: u64) -> u64 {
        let ts = if now_ns <= self.last {
            self.last + 1
        } else {
            now_ns
        };
        self.last = ts;
        ts
    }
}

/// Current wall clock as nanoseconds since the Unix epoch.
///
/// A clock set before 1970 reads as 0; the allocator's floor keeps the
/// emitted sequence increasing regardless.
pub(crate) fn wall_clock_ns() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}
