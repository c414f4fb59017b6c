//! Deterministic escape-loop statistics shared across the service and tools.
//!
//! `escape-core` defines the canonical rules that turn completion events into
//! per-user counters and a consecutive-day streak. Everything here is pure:
//! callers supply the prior record and the clock reading, and all record
//! mutation flows through [`engine::StatsEngine`].
pub mod calendar;
pub mod engine;
pub mod error;
pub mod leaderboard;
pub mod state;

pub use calendar::{CalendarDay, day_gap};
pub use engine::{StatsEngine, StatsTransition, StreakChange, apply, apply_with_transition};
pub use error::{InvariantViolation, ValidationError};
pub use leaderboard::{
    DEFAULT_LEADERBOARD_LIMIT, LeaderboardLimit, MAX_LEADERBOARD_LIMIT, ranking_order,
};
pub use state::{CompletionEvent, LoopId, Timestamp, UserId, UserStats};
