//! In-memory StatsRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::RwLock;

use escape_core::{LeaderboardLimit, UserId, UserStats};

use crate::repository::record::{StoredStats, rank};
use crate::repository::{RepositoryError, Result, StatsRepository};

#[derive(Default)]
struct Table {
    records: HashMap<UserId, StoredStats>,
    next_seq: u64,
}

impl Table {
    fn take_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

/// In-memory implementation of StatsRepository.
///
/// Not persistent across process restarts. The write lock doubles as the
/// uniqueness constraint for record creation.
pub struct InMemoryStatsRepo {
    table: RwLock<Table>,
}

impl InMemoryStatsRepo {
    /// Create a new empty in-memory repository.
    pub fn new() -> Self {
        Self {
            table: RwLock::new(Table::default()),
        }
    }

    /// Create pre-populated with records, in creation order.
    pub fn with_records(records: impl IntoIterator<Item = UserStats>) -> Self {
        let mut table = Table::default();
        for stats in records {
            let seq = table.take_seq();
            table
                .records
                .insert(stats.user_id.clone(), StoredStats::new(seq, stats));
        }
        Self {
            table: RwLock::new(table),
        }
    }
}

impl Default for InMemoryStatsRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl StatsRepository for InMemoryStatsRepo {
    fn load(&self, user_id: &UserId) -> Result<Option<UserStats>> {
        let table = self
            .table
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(table.records.get(user_id).map(|record| record.stats.clone()))
    }

    fn insert_new(&self, stats: &UserStats) -> Result<bool> {
        let mut table = self
            .table
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if table.records.contains_key(&stats.user_id) {
            return Ok(false);
        }
        let seq = table.take_seq();
        table
            .records
            .insert(stats.user_id.clone(), StoredStats::new(seq, stats.clone()));
        Ok(true)
    }

    fn upsert(&self, stats: &UserStats) -> Result<()> {
        let mut table = self
            .table
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let seq = match table.records.get(&stats.user_id) {
            Some(existing) => existing.created_seq,
            None => table.take_seq(),
        };
        match table.records.entry(stats.user_id.clone()) {
            Entry::Occupied(mut slot) => slot.get_mut().stats = stats.clone(),
            Entry::Vacant(slot) => {
                slot.insert(StoredStats::new(seq, stats.clone()));
            }
        }
        Ok(())
    }

    fn top_n(&self, limit: LeaderboardLimit) -> Result<Vec<UserStats>> {
        let snapshot: Vec<StoredStats> = {
            let table = self
                .table
                .read()
                .map_err(|_| RepositoryError::LockPoisoned)?;
            table.records.values().cloned().collect()
        };
        Ok(rank(snapshot, limit.get()))
    }

    fn count(&self) -> Result<usize> {
        let table = self
            .table
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(table.records.len())
    }
}
