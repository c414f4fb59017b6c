//! Leaderboard size policy and ranking order.

use std::cmp::Ordering;

use crate::error::ValidationError;
use crate::state::UserStats;

/// Largest leaderboard a single request may return.
pub const MAX_LEADERBOARD_LIMIT: usize = 100;

/// Leaderboard size used when the caller does not ask for one.
pub const DEFAULT_LEADERBOARD_LIMIT: usize = 10;

/// Validated leaderboard size, always in `1..=MAX_LEADERBOARD_LIMIT`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LeaderboardLimit(usize);

impl LeaderboardLimit {
    /// Rejects non-positive sizes and caps oversized ones.
    pub fn new(requested: i64) -> Result<Self, ValidationError> {
        if requested <= 0 {
            return Err(ValidationError::NonPositiveLimit { requested });
        }
        let capped = usize::try_from(requested)
            .unwrap_or(MAX_LEADERBOARD_LIMIT)
            .min(MAX_LEADERBOARD_LIMIT);
        Ok(Self(capped))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for LeaderboardLimit {
    fn default() -> Self {
        Self(DEFAULT_LEADERBOARD_LIMIT)
    }
}

/// Ranking order for leaderboard entries.
///
/// Higher `total_escapes` first; ties go to the record created earlier
/// (lower `created_seq`), then to the lexically smaller user id.
pub fn ranking_order(a: (&UserStats, u64), b: (&UserStats, u64)) -> Ordering {
    let (a_stats, a_seq) = a;
    let (b_stats, b_seq) = b;

    b_stats
        .total_escapes
        .cmp(&a_stats.total_escapes)
        .then(a_seq.cmp(&b_seq))
        .then_with(|| a_stats.user_id.cmp(&b_stats.user_id))
}
