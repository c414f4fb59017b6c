//! File-based repository implementations.

mod audit;
mod stats;

pub use audit::{AUDIT_LOG_FILE, AuditLogReader, FileAuditLog};
pub use stats::{FileStatsRepository, USERS_DIR};
