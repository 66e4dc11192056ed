//! Wall clock abstraction for diagnostic timestamps.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;

use crate::config::DIAGNOSTIC_TIMESTAMP_FORMAT;

/// Source of the current time, injected so log lines can be tested.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Render an instant as `YYYY-MM-DD HH:MM:SS` in the given zone.
pub fn format_timestamp(instant: DateTime<Utc>, tz: Tz) -> String {
    instant
        .with_timezone(&tz)
        .format(DIAGNOSTIC_TIMESTAMP_FORMAT)
        .to_string()
}
