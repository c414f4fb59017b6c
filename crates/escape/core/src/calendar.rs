//! Calendar-day arithmetic on the reference clock.
//!
//! A "day" is the UTC calendar date of a timestamp. Two events belong to the
//! same day bucket exactly when their dates compare equal, regardless of how
//! far apart they are in wall-clock time.

use chrono::NaiveDate;

use crate::state::Timestamp;

/// Calendar date of a timestamp on the reference clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CalendarDay(NaiveDate);

impl CalendarDay {
    /// Returns the calendar day containing `timestamp`.
    pub fn of(timestamp: Timestamp) -> Self {
        Self(timestamp.date_naive())
    }

    /// Underlying date.
    pub fn date(self) -> NaiveDate {
        self.0
    }

    /// Whole calendar days from `self` to `later`.
    ///
    /// Negative when `later` is actually earlier (clock skew).
    pub fn days_until(self, later: CalendarDay) -> i64 {
        (later.0 - self.0).num_days()
    }
}

impl std::fmt::Display for CalendarDay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Whole calendar days between the dates of `previous` and `now`.
pub fn day_gap(previous: Timestamp, now: Timestamp) -> i64 {
    CalendarDay::of(previous).days_until(CalendarDay::of(now))
}
