//! Time remaining until a target instant.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeLeft {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl TimeLeft {
    /// Remaining time from `now` until `target`, clamped at zero.
    ///
    /// Days are whole elapsed days, not calendar days within a month, so a
    /// target ten weeks out reads as 70 days.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let total = (target - now).num_seconds();
        if total <= 0 {
            return Self::default();
        }
        Self {
            days: total / 86_400,
            hours: (total % 86_400) / 3_600,
            minutes: (total % 3_600) / 60,
            seconds: total % 60,
        }
    }

    pub fn is_elapsed(&self) -> bool {
        self.days <= 0 && self.hours <= 0 && self.minutes <= 0 && self.seconds <= 0
    }
}

impl fmt::Display for TimeLeft {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02} Days {:02} Hours {:02} Mins {:02} Secs",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
