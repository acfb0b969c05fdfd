//! League wall-clock sources.

use std::sync::Mutex;

use time::{OffsetDateTime, PrimitiveDateTime, UtcOffset};

/// Supplies the current league-local wall-clock time.
pub trait Clock: Send + Sync {
    /// Current league-local time.
    fn now(&self) -> PrimitiveDateTime;
}

/// Real time, shifted from UTC by the configured league offset.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    offset: UtcOffset,
}

impl SystemClock {
    /// Clock for a league running at `offset` from UTC.
    pub fn new(offset: UtcOffset) -> Self {
        Self { offset }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> PrimitiveDateTime {
        let now = OffsetDateTime::now_utc().to_offset(self.offset);
        PrimitiveDateTime::new(now.date(), now.time())
    }
}

/// Clock frozen at an explicit instant until moved with [`ManualClock::set`].
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<PrimitiveDateTime>,
}

impl ManualClock {
    /// Clock frozen at `now`.
    pub fn new(now: PrimitiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: PrimitiveDateTime) {
        match self.now.lock() {
            Ok(mut guard) => *guard = now,
            Err(poisoned) => *poisoned.into_inner() = now,
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> PrimitiveDateTime {
        match self.now.lock() {
            Ok(guard) => *guard,
            Err(poisoned) => *poisoned.into_inner(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::{datetime, offset};

    #[test]
    fn manual_clock_returns_what_was_set() {
        let clock = ManualClock::new(datetime!(2025-07-07 00:00:00));
        assert_eq!(clock.now(), datetime!(2025-07-07 00:00:00));
        clock.set(datetime!(2025-07-10 18:30:00));
        assert_eq!(clock.now(), datetime!(2025-07-10 18:30:00));
    }

    #[test]
    fn system_clock_applies_offset() {
        let utc = SystemClock::new(offset!(UTC)).now();
        let ahead = SystemClock::new(offset!(+2)).now();
        let shift = ahead - utc;
        assert!(shift > time::Duration::minutes(119) && shift < time::Duration::minutes(121));
    }
}
