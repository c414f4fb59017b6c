//! Command implementations for xtask
//!
//! Each command is a separate module that implements its own CLI args and execution logic.

mod clean;
mod read_audit;
mod read_stats;

pub use clean::Clean;
pub use read_audit::ReadAudit;
pub use read_stats::ReadStats;
