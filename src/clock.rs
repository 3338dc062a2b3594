//! Time sources for the wall-clock variants.
//!
//! Schedulers only ever *read* a clock; they never sleep or wait on one. A reading is a
//! [`Duration`] since an arbitrary, clock-specific origin. Readings are expected to be
//! monotonic, but schedulers tolerate a clock that steps backwards: a negative delta is
//! treated as zero elapsed time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A readable time source.
pub trait Clock {
    /// Current reading.
    fn now(&self) -> Duration;

    /// Time from `since` to now, saturating at zero.
    fn elapsed_since(&self, since: Duration) -> Duration {
        self.now().saturating_sub(since)
    }
}

/// Real time, measured from construction with [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Clones share the same reading, so a test can keep one handle and give another to a
/// scheduler:
///
/// ```rust
/// use std::time::Duration;
/// use seqhalve::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let handle = clock.clone();
/// handle.advance(Duration::from_millis(5));
/// assert_eq!(clock.now(), Duration::from_millis(5));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    nanos: Arc<AtomicU64>,
}

impl ManualClock {
    /// A clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.nanos
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |n| {
                Some(n.saturating_add(by))
            })
            .ok();
    }

    /// Set the reading. Setting an earlier value simulates a clock stepping backwards.
    pub fn set(&self, to: Duration) {
        let to = u64::try_from(to.as_nanos()).unwrap_or(u64::MAX);
        self.nanos.store(to, Ordering::Relaxed);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_nanos(self.nanos.load(Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let a = ManualClock::new();
        let b = a.clone();
        a.advance(Duration::from_millis(10));
        b.advance(Duration::from_millis(5));
        assert_eq!(a.now(), Duration::from_millis(15));
    }

    #[test]
    fn backwards_step_saturates_to_zero_elapsed() {
        let c = ManualClock::new();
        c.set(Duration::from_millis(100));
        let start = c.now();
        c.set(Duration::from_millis(40));
        assert_eq!(c.elapsed_since(start), Duration::ZERO);
    }

    #[test]
    fn monotonic_clock_does_not_go_backwards() {
        let c = MonotonicClock::new();
        let a = c.now();
        let b = c.now();
        assert!(b >= a);
    }
}
