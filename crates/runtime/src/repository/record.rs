//! Stored form of a statistics record.

use serde::{Deserialize, Serialize};

use escape_core::{UserStats, ranking_order};

/// A record as kept by a repository.
///
/// `created_seq` is assigned once at creation and orders ties on the
/// leaderboard; it is never exposed through [`UserStats`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredStats {
    pub created_seq: u64,
    pub stats: UserStats,
}

impl StoredStats {
    pub fn new(created_seq: u64, stats: UserStats) -> Self {
        Self { created_seq, stats }
    }
}

/// Sorts records into leaderboard order and keeps the first `limit`.
pub(crate) fn rank(mut records: Vec<StoredStats>, limit: usize) -> Vec<UserStats> {
    records.sort_by(|a, b| ranking_order((&a.stats, a.created_seq), (&b.stats, b.created_seq)));
    records.truncate(limit);
    records.into_iter().map(|record| record.stats).collect()
}
