//! In-memory repository implementations for tests and local runs.

mod audit;
mod stats;

pub use audit::InMemoryAuditLog;
pub use stats::InMemoryStatsRepo;
