//! Error types for input validation and record invariants.
//!
//! Validation errors describe malformed caller input and are raised before
//! the engine runs. Invariant violations describe records that could never
//! have been produced by the engine and usually indicate corrupted storage.

use thiserror::Error;

/// Caller input rejected before any record is read or written.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("user id must not be empty")]
    EmptyUserId,

    #[error("user id is {len} bytes, maximum is {max}")]
    UserIdTooLong { len: usize, max: usize },

    #[error("user id contains control characters")]
    UserIdControlChars,

    #[error("loop id {input:?} is not a valid loop identifier")]
    MalformedLoopId { input: String },

    #[error("success flag {input:?} is not a boolean")]
    MalformedSuccess { input: String },

    #[error("leaderboard limit must be positive, got {requested}")]
    NonPositiveLimit { requested: i64 },
}

/// A stored record that breaks the counter invariants.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("today_escapes {today} exceeds total_escapes {total}")]
    TodayExceedsTotal { today: u64, total: u64 },

    #[error("record has {total} escapes but no last_escape")]
    CountsWithoutLastEscape { total: u64 },

    #[error("streak {streak} exceeds total_escapes {total}")]
    StreakExceedsTotal { streak: u64, total: u64 },

    #[error(transparent)]
    InvalidUserId(#[from] ValidationError),
}
