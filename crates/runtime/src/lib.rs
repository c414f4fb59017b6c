//! Service layer for escape-loop statistics.
//!
//! This crate wires the pure engine in `escape-core` to storage, the loop
//! catalog, authorization and a clock, and exposes the request-level API
//! through [`StatsService`].
//!
//! Modules are organized by responsibility:
//! - [`service`] hosts the orchestrator and builder
//! - [`api`] exposes the request and error types clients interact with
//! - [`events`] provides a topic-based event bus for service events
//! - [`auth`], [`clock`] and [`repository`] provide the collaborators the
//!   service depends on
pub mod api;
pub mod auth;
pub mod clock;
pub mod events;
pub mod repository;
pub mod service;

mod locks;

pub use api::{CompletionRequest, ErrorKind, Result, ServiceError};
pub use auth::{AuthError, Authorizer, SharedSecretAuthorizer, bearer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use events::{AuditEvent, Event, EventBus, StatsEvent, Topic};
pub use repository::{
    AuditLogReader, AuditRepository, Fetched, FileAuditLog, FileStatsRepository,
    InMemoryAuditLog, InMemoryStatsRepo, RepositoryError, StatsRepository, StoredStats,
};
pub use service::{ServiceConfig, StatsService, StatsServiceBuilder};
