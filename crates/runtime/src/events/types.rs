//! Event types for different topics.

use escape_core::{CompletionEvent, StatsTransition, Timestamp, UserId, UserStats};

/// Events about user records.
#[derive(Debug, Clone)]
pub enum StatsEvent {
    /// A zero-valued record was created on first contact.
    UserCreated {
        user_id: UserId,
        join_date: Timestamp,
    },

    /// A completion event was applied and the record persisted.
    CompletionApplied {
        event: CompletionEvent,
        transition: StatsTransition,
        stats: UserStats,
    },
}

/// Events about the audit trail.
#[derive(Debug, Clone)]
pub enum AuditEvent {
    /// The audit row could not be written; the stats update still stands.
    AppendFailed {
        event: CompletionEvent,
        error: String,
    },
}
