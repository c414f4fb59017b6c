//! Topic-based event bus for service events.
//!
//! Events are published to specific topics, and consumers can subscribe only
//! to the topics they need. Delivery is best-effort.

mod bus;
mod types;

pub use bus::{Event, EventBus, Topic};
pub use types::{AuditEvent, StatsEvent};
