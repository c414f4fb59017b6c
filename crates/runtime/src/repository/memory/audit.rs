//! In-memory audit log implementation.

use std::sync::RwLock;

use escape_core::CompletionEvent;

use crate::repository::{AuditRepository, RepositoryError, Result};

/// In-memory audit log for testing and development.
pub struct InMemoryAuditLog {
    entries: RwLock<Vec<CompletionEvent>>,
}

impl InMemoryAuditLog {
    /// Create a new empty in-memory audit log.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Get all entries (for testing/debugging).
    pub fn entries(&self) -> Result<Vec<CompletionEvent>> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.clone())
    }
}

impl Default for InMemoryAuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditRepository for InMemoryAuditLog {
    fn append(&self, event: &CompletionEvent) -> Result<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        entries.push(event.clone());
        Ok(())
    }

    fn len(&self) -> Result<u64> {
        let entries = self
            .entries
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(entries.len() as u64)
    }
}
