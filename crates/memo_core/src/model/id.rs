//! Identity allocation for notes and folders.
//!
//! # Responsibility
//! - Produce time-ordered ids shared by notes and folders.
//!
//! # Invariants
//! - Ids returned by one allocator are strictly increasing.
//! - Two calls within the same clock tick never return the same id; the
//!   later call is bumped past the previous one.
//! - After `observe`, no id at or below the observed value is handed out.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Identifier shared by notes and folders (epoch milliseconds at creation).
pub type EntityId = i64;

/// Time source used by [`IdAllocator`].
pub trait Clock {
    /// Returns current time as Unix epoch milliseconds.
    fn now_millis(&self) -> i64;
}

/// Wall-clock time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(saturating_millis)
            .unwrap_or(0)
    }
}

/// Whole milliseconds in `elapsed`, clamped to `i64::MAX`.
fn saturating_millis(elapsed: Duration) -> i64 {
    i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX)
}

/// Monotonic id allocator backed by a clock.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator<C: Clock = SystemClock> {
    clock: C,
    last: Option<EntityId>,
}

impl IdAllocator<SystemClock> {
    /// Creates an allocator over the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<C: Clock> IdAllocator<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock, last: None }
    }

    /// Returns the next id.
    ///
    /// Uses the clock reading when it is ahead of the last id, otherwise
    /// `last + 1`.
    pub fn next(&mut self) -> EntityId {
        let now = self.clock.now_millis();
        let id = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(id);
        id
    }

    /// Raises the floor so later ids are greater than `existing`.
    ///
    /// Called with the largest id found in persisted state.
    pub fn observe(&mut self, existing: EntityId) {
        if self.last.map_or(true, |last| existing > last) {
            self.last = Some(existing);
        }
    }

    /// Returns the most recently issued or observed id.
    pub fn last(&self) -> Option<EntityId> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::{saturating_millis, Clock, IdAllocator};
    use std::cell::Cell;
    use std::time::Duration;

    struct FixedClock(Cell<i64>);

    impl Clock for FixedClock {
        fn now_millis(&self) -> i64 {
            self.0.get()
        }
    }

    #[test]
    fn same_tick_calls_are_bumped() {
        let mut ids = IdAllocator::with_clock(FixedClock(Cell::new(1_000)));
        assert_eq!(ids.next(), 1_000);
        assert_eq!(ids.next(), 1_001);
        assert_eq!(ids.next(), 1_002);
    }

    #[test]
    fn clock_ahead_of_last_wins() {
        let clock = FixedClock(Cell::new(10));
        let mut ids = IdAllocator::with_clock(clock);
        assert_eq!(ids.next(), 10);
        ids.clock.0.set(50);
        assert_eq!(ids.next(), 50);
    }

    #[test]
    fn clock_going_backwards_stays_monotonic() {
        let mut ids = IdAllocator::with_clock(FixedClock(Cell::new(500)));
        assert_eq!(ids.next(), 500);
        ids.clock.0.set(100);
        assert_eq!(ids.next(), 501);
    }

    #[test]
    fn observe_raises_floor_but_never_lowers_it() {
        let mut ids = IdAllocator::with_clock(FixedClock(Cell::new(10)));
        ids.observe(99);
        assert_eq!(ids.next(), 100);
        ids.observe(5);
        assert_eq!(ids.last(), Some(100));
    }

    #[test]
    fn system_clock_ids_increase() {
        let mut ids = IdAllocator::new();
        let first = ids.next();
        let second = ids.next();
        assert!(second > first);
    }

    #[test]
    fn millis_saturate_instead_of_wrapping() {
        assert_eq!(saturating_millis(Duration::from_millis(1_500)), 1_500);
        assert_eq!(saturating_millis(Duration::MAX), i64::MAX);
    }
}
