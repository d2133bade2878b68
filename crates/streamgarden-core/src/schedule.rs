//! Periodic jobs driven by absolute time.
//!
//! The engine is ticked at whatever rate its host chooses. Each job keeps
//! its own deadline and runs at most once per tick when that deadline has
//! passed, so a late or irregular tick never runs a job twice in a row.

use chrono::{DateTime, Duration, Utc};

/// A job that is due every `interval_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Periodic {
    interval_ms: i64,
    next_due: DateTime<Utc>,
}

impl Periodic {
    /// A job first due one interval after `now`.
    pub fn starting_at(interval_ms: i64, now: DateTime<Utc>) -> Self {
        let interval_ms = interval_ms.max(1);
        Self {
            interval_ms,
            next_due: Self::after(now, interval_ms),
        }
    }

    /// Whether the job is due at `now`. If it is, the next deadline moves
    /// one interval past `now`.
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due = Self::after(now, self.interval_ms);
        true
    }

    /// Restart the interval from `now`.
    pub fn rebase(&mut self, now: DateTime<Utc>) {
        self.next_due = Self::after(now, self.interval_ms);
    }

    /// When the job next runs.
    pub const fn next_due(&self) -> DateTime<Utc> {
        self.next_due
    }

    fn after(now: DateTime<Utc>, interval_ms: i64) -> DateTime<Utc> {
        now.checked_add_signed(Duration::milliseconds(interval_ms))
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
