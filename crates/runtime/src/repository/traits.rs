//! Repository contracts for per-user statistics and the audit trail.

use escape_core::{CompletionEvent, LeaderboardLimit, Timestamp, UserId, UserStats};

use super::{RepositoryError, Result};

/// Record returned by [`StatsRepository::get_or_create`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Fetched {
    pub stats: UserStats,
    /// True when this call created the record.
    pub created: bool,
}

/// Repository for per-user statistics records.
///
/// Implementations must make [`insert_new`](Self::insert_new) an atomic
/// insert-if-absent keyed by user id; everything else may be a plain
/// read or overwrite. Read-modify-write serialization is the caller's job.
pub trait StatsRepository: Send + Sync {
    /// Load the record for a user.
    fn load(&self, user_id: &UserId) -> Result<Option<UserStats>>;

    /// Insert a record if none exists for its user.
    ///
    /// Returns `false`, leaving the stored record untouched, when one exists.
    fn insert_new(&self, stats: &UserStats) -> Result<bool>;

    /// Replace the stored record in full, creating it if necessary.
    fn upsert(&self, stats: &UserStats) -> Result<()>;

    /// Up to `limit` records in ranking order.
    fn top_n(&self, limit: LeaderboardLimit) -> Result<Vec<UserStats>>;

    /// Number of stored records.
    fn count(&self) -> Result<usize>;

    /// Load the record for a user, creating a zero-valued one stamped with
    /// `now` if absent.
    ///
    /// Losing a concurrent creation race is not an error: the winner's
    /// record is fetched and returned.
    fn get_or_create(&self, user_id: &UserId, now: Timestamp) -> Result<Fetched> {
        if let Some(stats) = self.load(user_id)? {
            return Ok(Fetched {
                stats,
                created: false,
            });
        }

        let fresh = UserStats::new(user_id.clone(), now);
        if self.insert_new(&fresh)? {
            return Ok(Fetched {
                stats: fresh,
                created: true,
            });
        }

        tracing::debug!("Creation conflict for {}, fetching winner", user_id);
        self.load(user_id)?
            .map(|stats| Fetched {
                stats,
                created: false,
            })
            .ok_or_else(|| {
                RepositoryError::CorruptedData(format!(
                    "record for {} vanished after a conflicting insert",
                    user_id
                ))
            })
    }
}

/// Append-only audit trail of completion events.
pub trait AuditRepository: Send + Sync {
    /// Append one event.
    fn append(&self, event: &CompletionEvent) -> Result<()>;

    /// Number of entries written so far.
    fn len(&self) -> Result<u64>;

    fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}
