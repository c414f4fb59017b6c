//! Canonical per-user record and the event that mutates it.
//!
//! [`UserStats`] is the only persisted entity. It is created lazily with all
//! counters at zero and afterwards changes only through
//! [`crate::engine::StatsEngine`].

mod event;

pub use event::{CompletionEvent, LoopId};

use chrono::{DateTime, Utc};

use crate::error::{InvariantViolation, ValidationError};

/// Reference clock timestamp. Day boundaries are taken from its UTC date.
pub type Timestamp = DateTime<Utc>;

/// Opaque user identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct UserId(String);

impl UserId {
    /// Longest accepted identifier, in bytes.
    pub const MAX_LEN: usize = 128;

    /// Validates and wraps a raw identifier.
    pub fn parse(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        Self::check(&raw)?;
        Ok(Self(raw))
    }

    fn check(raw: &str) -> Result<(), ValidationError> {
        if raw.is_empty() {
            return Err(ValidationError::EmptyUserId);
        }
        if raw.len() > Self::MAX_LEN {
            return Err(ValidationError::UserIdTooLong {
                len: raw.len(),
                max: Self::MAX_LEN,
            });
        }
        if raw.chars().any(char::is_control) {
            return Err(ValidationError::UserIdControlChars);
        }
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Running escape statistics for one user.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UserStats {
    pub user_id: UserId,

    /// Set at first contact and never changed afterwards.
    pub join_date: Timestamp,

    /// Completion events of any outcome.
    pub total_escapes: u64,

    /// Completion events on the calendar day of `last_escape`.
    pub today_escapes: u64,

    /// Most recent completion event; `None` until the first one.
    pub last_escape: Option<Timestamp>,

    /// Consecutive calendar days with at least one success.
    pub streak: u64,
}

impl UserStats {
    /// Zero-valued record for a user first seen at `join_date`.
    pub fn new(user_id: UserId, join_date: Timestamp) -> Self {
        Self {
            user_id,
            join_date,
            total_escapes: 0,
            today_escapes: 0,
            last_escape: None,
            streak: 0,
        }
    }

    /// True until the first completion event has been applied.
    pub fn is_fresh(&self) -> bool {
        self.last_escape.is_none()
    }

    /// Checks the counter invariants that every engine-produced record holds.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        UserId::check(self.user_id.as_str())?;

        if self.today_escapes > self.total_escapes {
            return Err(InvariantViolation::TodayExceedsTotal {
                today: self.today_escapes,
                total: self.total_escapes,
            });
        }
        if self.last_escape.is_none() && self.total_escapes > 0 {
            return Err(InvariantViolation::CountsWithoutLastEscape {
                total: self.total_escapes,
            });
        }
        if self.streak > self.total_escapes {
            return Err(InvariantViolation::StreakExceedsTotal {
                streak: self.streak,
                total: self.total_escapes,
            });
        }
        Ok(())
    }
}
