//! Stats service orchestrator.
//!
//! The service authorizes each request, serializes read-modify-write per
//! user, runs the engine, persists the result and then fans out to the audit
//! trail and the event bus. It exposes a builder-based API so callers can
//! inject storage, catalog, authorizer and clock.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;

use escape_content::{FallbackCatalog, Loop, LoopCatalog, StaticCatalog};
use escape_core::{
    CompletionEvent, LeaderboardLimit, StatsTransition, UserId, UserStats, apply_with_transition,
};

use crate::api::{CompletionRequest, Result, ServiceError};
use crate::auth::Authorizer;
use crate::clock::{Clock, SystemClock};
use crate::events::{AuditEvent, Event, EventBus, StatsEvent, Topic};
use crate::locks::UserLocks;
use crate::repository::{
    AuditRepository, InMemoryAuditLog, InMemoryStatsRepo, StatsRepository,
};

/// Service configuration.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub event_buffer_size: usize,
    /// Leaderboard size used when a request does not specify one.
    pub default_leaderboard_limit: LeaderboardLimit,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 100,
            default_leaderboard_limit: LeaderboardLimit::default(),
        }
    }
}

/// Cloneable handle to the stats service.
///
/// All clones share storage, locks and the event bus, so it can be handed
/// to as many request tasks as needed.
#[derive(Clone)]
pub struct StatsService {
    inner: Arc<Inner>,
}

struct Inner {
    config: ServiceConfig,
    stats: Arc<dyn StatsRepository>,
    audit: Arc<dyn AuditRepository>,
    catalog: Arc<dyn LoopCatalog>,
    authorizer: Arc<dyn Authorizer>,
    clock: Arc<dyn Clock>,
    locks: UserLocks,
    events: EventBus,
    audit_failures: AtomicU64,
}

/// Outcome of the locked section of a completion.
struct Applied {
    stats: UserStats,
    transition: StatsTransition,
    event: CompletionEvent,
    created: bool,
}

impl StatsService {
    /// Create a new service builder
    pub fn builder() -> StatsServiceBuilder {
        StatsServiceBuilder::new()
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.inner.config
    }

    /// Return a user's record, creating a zero-valued one on first contact.
    pub async fn fetch_stats(&self, credential: Option<&str>, user_id: &str) -> Result<UserStats> {
        self.inner.authorizer.authorize(credential)?;
        let user_id = UserId::parse(user_id)?;

        let now = self.inner.clock.now();
        let fetched = self.inner.stats.get_or_create(&user_id, now)?;

        if fetched.created {
            self.publish_created(&fetched.stats);
        }

        tracing::debug!("Fetched stats for {}", user_id);
        Ok(fetched.stats)
    }

    /// Apply one completion event and return the updated record.
    ///
    /// The stats update is durable once this returns `Ok`. A failed audit
    /// append is reported on the event bus but does not fail the call.
    pub async fn record_completion(
        &self,
        credential: Option<&str>,
        user_id: &str,
        request: CompletionRequest,
    ) -> Result<UserStats> {
        self.inner.authorizer.authorize(credential)?;
        let user_id = UserId::parse(user_id)?;

        let applied = {
            let _guard = self.inner.locks.lock(&user_id).await;
            self.apply_locked(&user_id, request)?
        };

        tracing::info!(
            user = %user_id,
            loop_id = %request.loop_id,
            success = request.success,
            streak = applied.stats.streak,
            change = %applied.transition.streak_change,
            "Recorded completion"
        );

        self.write_audit(&applied.event);

        if applied.created {
            self.publish_created(&applied.stats);
        }
        self.inner
            .events
            .publish(Event::Stats(StatsEvent::CompletionApplied {
                event: applied.event,
                transition: applied.transition,
                stats: applied.stats.clone(),
            }));

        Ok(applied.stats)
    }

    /// Read, apply and persist under the caller's per-user lock.
    ///
    /// The timestamp is taken here so lock order and time order agree.
    fn apply_locked(&self, user_id: &UserId, request: CompletionRequest) -> Result<Applied> {
        let now = self.inner.clock.now();
        let fetched = self.inner.stats.get_or_create(user_id, now)?;

        let (stats, transition) =
            apply_with_transition(Some(fetched.stats), user_id, request.success, now);
        self.inner.stats.upsert(&stats)?;

        Ok(Applied {
            stats,
            transition,
            event: CompletionEvent::new(user_id.clone(), request.loop_id, request.success, now),
            created: fetched.created,
        })
    }

    fn write_audit(&self, event: &CompletionEvent) {
        if let Err(e) = self.inner.audit.append(event) {
            self.inner.audit_failures.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(
                user = %event.user_id,
                loop_id = %event.loop_id,
                "Audit append failed: {}",
                e
            );
            self.inner
                .events
                .publish(Event::Audit(AuditEvent::AppendFailed {
                    event: event.clone(),
                    error: e.to_string(),
                }));
        }
    }

    fn publish_created(&self, stats: &UserStats) {
        tracing::info!(user = %stats.user_id, "Created stats record");
        self.inner
            .events
            .publish(Event::Stats(StatsEvent::UserCreated {
                user_id: stats.user_id.clone(),
                join_date: stats.join_date,
            }));
    }

    /// Top users by total escapes.
    ///
    /// `None` uses the configured default size; non-positive sizes are
    /// rejected and oversized ones capped.
    pub async fn leaderboard(
        &self,
        credential: Option<&str>,
        limit: Option<i64>,
    ) -> Result<Vec<UserStats>> {
        self.inner.authorizer.authorize(credential)?;
        let limit = match limit {
            Some(requested) => LeaderboardLimit::new(requested)?,
            None => self.inner.config.default_leaderboard_limit,
        };

        let entries = self.inner.stats.top_n(limit)?;
        tracing::debug!("Leaderboard of {} (limit {})", entries.len(), limit.get());
        Ok(entries)
    }

    /// The loop catalog. Needs no credential.
    pub async fn loops(&self) -> Result<Vec<Loop>> {
        self.inner.catalog.loops().await.map_err(ServiceError::from)
    }

    /// Subscribe to service events on a topic.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.inner.events.subscribe(topic)
    }

    /// Number of audit appends that failed since start.
    pub fn audit_failures(&self) -> u64 {
        self.inner.audit_failures.load(Ordering::Relaxed)
    }
}

/// Builder for [`StatsService`] with flexible configuration.
pub struct StatsServiceBuilder {
    config: ServiceConfig,
    stats: Option<Arc<dyn StatsRepository>>,
    audit: Option<Arc<dyn AuditRepository>>,
    catalog: Option<Arc<dyn LoopCatalog>>,
    authorizer: Option<Arc<dyn Authorizer>>,
    clock: Option<Arc<dyn Clock>>,
}

impl StatsServiceBuilder {
    fn new() -> Self {
        Self {
            config: ServiceConfig::default(),
            stats: None,
            audit: None,
            catalog: None,
            authorizer: None,
            clock: None,
        }
    }

    /// Override service configuration
    pub fn config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the stats store (default: in-memory)
    pub fn stats_repository(mut self, repo: Arc<dyn StatsRepository>) -> Self {
        self.stats = Some(repo);
        self
    }

    /// Set the audit trail (default: in-memory)
    pub fn audit_repository(mut self, repo: Arc<dyn AuditRepository>) -> Self {
        self.audit = Some(repo);
        self
    }

    /// Set the loop catalog. Failures and empty results fall back to the
    /// built-in loops.
    pub fn catalog(mut self, catalog: impl LoopCatalog + 'static) -> Self {
        self.catalog = Some(Arc::new(FallbackCatalog::new(catalog)));
        self
    }

    /// Set required authorizer
    pub fn authorizer(mut self, authorizer: impl Authorizer + 'static) -> Self {
        self.authorizer = Some(Arc::new(authorizer));
        self
    }

    /// Set the clock (default: system UTC clock)
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Build the service
    pub fn build(self) -> Result<StatsService> {
        let authorizer = self.authorizer.ok_or(ServiceError::MissingAuthorizer)?;

        let inner = Inner {
            events: EventBus::with_capacity(self.config.event_buffer_size),
            config: self.config,
            stats: self
                .stats
                .unwrap_or_else(|| Arc::new(InMemoryStatsRepo::new())),
            audit: self
                .audit
                .unwrap_or_else(|| Arc::new(InMemoryAuditLog::new())),
            catalog: self.catalog.unwrap_or_else(|| Arc::new(StaticCatalog)),
            authorizer,
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            locks: UserLocks::new(),
            audit_failures: AtomicU64::new(0),
        };

        Ok(StatsService {
            inner: Arc::new(inner),
        })
    }
}
