//! Monotonic timing used for timeout and rate-limit arithmetic.
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// Point on the host's monotonic timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    #[must_use]
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Time elapsed since `earlier`; a clock that stepped backwards yields zero.
    #[must_use]
    pub const fn saturating_since(self, earlier: Self) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }

    #[must_use]
    pub const fn saturating_add(self, delta: Duration) -> Self {
        let millis = delta.as_millis();
        let millis = if millis > u64::MAX as u128 {
            u64::MAX
        } else {
            millis as u64
        };
        Self(self.0.saturating_add(millis))
    }
}

/// Source of "now" for the state machine.
pub trait Clock {
    fn now(&self) -> Timestamp;
}

/// Wall clock anchored at construction.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        let millis = u64::try_from(self.origin.elapsed().as_millis()).unwrap_or(u64::MAX);
        Timestamp::from_millis(millis)
    }
}

/// Hand-driven clock for simulations and tests.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Cell<Timestamp>,
}

impl ManualClock {
    #[must_use]
    pub const fn starting_at(at: Timestamp) -> Self {
        Self { now: Cell::new(at) }
    }

    pub fn advance(&self, delta: Duration) {
        self.now.set(self.now.get().saturating_add(delta));
    }

    pub fn set(&self, at: Timestamp) {
        self.now.set(at);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        self.now.get()
    }
}

/// Elapsed time since an optional mark; an unset mark counts as infinitely old.
#[must_use]
pub fn elapsed_since(now: Timestamp, mark: Option<Timestamp>) -> Duration {
    mark.map_or(Duration::MAX, |mark| now.saturating_since(mark))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances_and_saturates() {
        let clock = ManualClock::starting_at(Timestamp::from_millis(1_000));
        clock.advance(Duration::from_millis(250));
        assert_eq!(clock.now().as_millis(), 1_250);
        clock.advance(Duration::MAX);
        assert_eq!(clock.now().as_millis(), u64::MAX);
    }

    #[test]
    fn backwards_steps_never_produce_elapsed_time() {
        let later = Timestamp::from_millis(5_000);
        let earlier = Timestamp::from_millis(2_000);
        assert_eq!(earlier.saturating_since(later), Duration::ZERO);
        assert_eq!(later.saturating_since(earlier), Duration::from_secs(3));
    }

    #[test]
    fn unset_mark_is_infinitely_old() {
        let now = Timestamp::from_millis(10);
        assert_eq!(elapsed_since(now, None), Duration::MAX);
        assert_eq!(
            elapsed_since(now, Some(Timestamp::from_millis(4))),
            Duration::from_millis(6)
        );
    }

    #[test]
    fn system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
