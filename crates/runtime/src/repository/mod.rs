//! Repository layer for mutable service data
//!
//! Repositories handle data that CHANGES as users complete loops:
//! - Per-user statistics records
//! - The completion audit trail
//!
//! Loop content is handled by the catalog, not by repositories.

mod error;
pub mod file;
pub mod memory;
mod record;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::{AUDIT_LOG_FILE, AuditLogReader, FileAuditLog, FileStatsRepository, USERS_DIR};
pub use memory::{InMemoryAuditLog, InMemoryStatsRepo};
pub use record::StoredStats;
pub use traits::{AuditRepository, Fetched, StatsRepository};
