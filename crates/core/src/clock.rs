//! Injectable time source.
//!
//! Journey release math and autosave bookkeeping both depend on "now".
//! Handlers and background tasks take a [`Clock`] instead of calling
//! `Utc::now()` directly so tests can pin or advance time deterministically.

use std::sync::Mutex;

use chrono::TimeDelta;

use crate::types::Timestamp;

/// A source of the current UTC time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// The real wall clock. Used everywhere outside of tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        chrono::Utc::now()
    }
}

/// A clock pinned to an explicit instant, advanced manually.
///
/// Lives in the library (not behind `cfg(test)`) because the `api` crate's
/// tests need it too.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<Timestamp>,
}

impl FixedClock {
    pub fn at(now: Timestamp) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: Timestamp) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now += delta;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let t = chrono::Utc::now();
        let clock = FixedClock::at(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn fixed_clock_advance_moves_forward() {
        let t = chrono::Utc::now();
        let clock = FixedClock::at(t);
        clock.advance(TimeDelta::hours(3));
        assert_eq!(clock.now(), t + TimeDelta::hours(3));
    }

    #[test]
    fn fixed_clock_set_replaces_instant() {
        let t = chrono::Utc::now();
        let clock = FixedClock::at(t);
        clock.set(t - TimeDelta::days(1));
        assert_eq!(clock.now(), t - TimeDelta::days(1));
    }
}
