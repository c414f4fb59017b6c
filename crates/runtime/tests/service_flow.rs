use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::{Duration, TimeZone, Utc};
use escape_core::{CompletionEvent, LeaderboardLimit, LoopId, Timestamp, UserId, UserStats};
use escape_runtime::repository::Result as RepoResult;
use escape_runtime::{
    AuditEvent, AuditRepository, CompletionRequest, ErrorKind, Event, FileAuditLog,
    FileStatsRepository, InMemoryAuditLog, InMemoryStatsRepo, ManualClock, RepositoryError,
    SharedSecretAuthorizer, StatsEvent, StatsRepository, StatsService, Topic,
};
use tempfile::TempDir;

const TOKEN: &str = "doomstop-secret-token";
const CREDENTIAL: Option<&str> = Some("Bearer doomstop-secret-token");

fn at(y: i32, m: u32, d: u32, h: u32) -> Timestamp {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn success(loop_id: u32) -> CompletionRequest {
    CompletionRequest::new(LoopId(loop_id), true)
}

fn failure(loop_id: u32) -> CompletionRequest {
    CompletionRequest::new(LoopId(loop_id), false)
}

// ============================================================================
// Test doubles
// ============================================================================

/// Counts every call before delegating to an in-memory store.
#[derive(Default)]
struct CountingRepo {
    inner: InMemoryStatsRepo,
    calls: AtomicUsize,
}

impl CountingRepo {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl StatsRepository for CountingRepo {
    fn load(&self, user_id: &UserId) -> RepoResult<Option<UserStats>> {
        self.touch();
        self.inner.load(user_id)
    }

    fn insert_new(&self, stats: &UserStats) -> RepoResult<bool> {
        self.touch();
        self.inner.insert_new(stats)
    }

    fn upsert(&self, stats: &UserStats) -> RepoResult<()> {
        self.touch();
        self.inner.upsert(stats)
    }

    fn top_n(&self, limit: LeaderboardLimit) -> RepoResult<Vec<UserStats>> {
        self.touch();
        self.inner.top_n(limit)
    }

    fn count(&self) -> RepoResult<usize> {
        self.touch();
        self.inner.count()
    }
}

/// Store whose medium is gone.
struct UnavailableRepo;

impl StatsRepository for UnavailableRepo {
    fn load(&self, _: &UserId) -> RepoResult<Option<UserStats>> {
        Err(RepositoryError::Unavailable("disk detached".into()))
    }

    fn insert_new(&self, _: &UserStats) -> RepoResult<bool> {
        Err(RepositoryError::Unavailable("disk detached".into()))
    }

    fn upsert(&self, _: &UserStats) -> RepoResult<()> {
        Err(RepositoryError::Unavailable("disk detached".into()))
    }

    fn top_n(&self, _: LeaderboardLimit) -> RepoResult<Vec<UserStats>> {
        Err(RepositoryError::Unavailable("disk detached".into()))
    }

    fn count(&self) -> RepoResult<usize> {
        Err(RepositoryError::Unavailable("disk detached".into()))
    }
}

/// Audit trail that rejects every write.
struct BrokenAudit;

impl AuditRepository for BrokenAudit {
    fn append(&self, _: &CompletionEvent) -> RepoResult<()> {
        Err(RepositoryError::Unavailable("audit table locked".into()))
    }

    fn len(&self) -> RepoResult<u64> {
        Ok(0)
    }
}

fn service_with(stats: Arc<dyn StatsRepository>, audit: Arc<dyn AuditRepository>) -> StatsService {
    StatsService::builder()
        .authorizer(SharedSecretAuthorizer::new(TOKEN))
        .stats_repository(stats)
        .audit_repository(audit)
        .build()
        .expect("service should build")
}

// ============================================================================
// Tests
// ============================================================================

/// Worked example: a three-day streak extended, held, then broken.
#[tokio::test]
async fn test_alice_streak_walkthrough() {
    println!("\n════════════════════════════════════════════════════════");
    println!("  ESCAPE TRACKER - Streak Walkthrough");
    println!("════════════════════════════════════════════════════════\n");

    let alice = UserId::parse("alice").unwrap();
    let prior = UserStats {
        user_id: alice.clone(),
        join_date: at(2023, 12, 20, 8),
        total_escapes: 10,
        today_escapes: 2,
        last_escape: Some(at(2024, 1, 1, 10)),
        streak: 3,
    };

    let clock = Arc::new(ManualClock::new(at(2024, 1, 2, 9)));
    let service = StatsService::builder()
        .authorizer(SharedSecretAuthorizer::new(TOKEN))
        .stats_repository(Arc::new(InMemoryStatsRepo::with_records([prior])))
        .clock(clock.clone())
        .build()
        .unwrap();

    println!("Next-day success extends the streak");
    let stats = service
        .record_completion(CREDENTIAL, "alice", success(1001))
        .await
        .unwrap();
    assert_eq!(stats.streak, 4);
    assert_eq!(stats.today_escapes, 1);
    assert_eq!(stats.total_escapes, 11);
    println!("  ✓ streak {}, today {}\n", stats.streak, stats.today_escapes);

    println!("Same-day success holds the streak");
    clock.set(at(2024, 1, 2, 18));
    let stats = service
        .record_completion(CREDENTIAL, "alice", success(2001))
        .await
        .unwrap();
    assert_eq!(stats.streak, 4);
    assert_eq!(stats.today_escapes, 2);
    assert_eq!(stats.total_escapes, 12);
    println!("  ✓ streak {}, today {}\n", stats.streak, stats.today_escapes);

    println!("Success after a gap restarts the streak");
    clock.set(at(2024, 1, 5, 9));
    let stats = service
        .record_completion(CREDENTIAL, "alice", success(3001))
        .await
        .unwrap();
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.today_escapes, 1);
    assert_eq!(stats.total_escapes, 13);
    assert_eq!(stats.join_date, at(2023, 12, 20, 8));
    println!("  ✓ streak {}, today {}\n", stats.streak, stats.today_escapes);
}

#[tokio::test]
async fn test_failures_count_but_leave_streak_alone() {
    let clock = Arc::new(ManualClock::new(at(2024, 3, 1, 12)));
    let service = StatsService::builder()
        .authorizer(SharedSecretAuthorizer::new(TOKEN))
        .clock(clock.clone())
        .build()
        .unwrap();

    let stats = service
        .record_completion(CREDENTIAL, "bob", failure(1002))
        .await
        .unwrap();
    assert_eq!(stats.total_escapes, 1);
    assert_eq!(stats.streak, 0);
    assert_eq!(stats.join_date, at(2024, 3, 1, 12));

    clock.advance(Duration::days(1));
    service
        .record_completion(CREDENTIAL, "bob", success(1002))
        .await
        .unwrap();
    clock.advance(Duration::days(1));
    let stats = service
        .record_completion(CREDENTIAL, "bob", failure(1003))
        .await
        .unwrap();

    assert_eq!(stats.total_escapes, 3);
    assert_eq!(stats.today_escapes, 1);
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.last_escape, Some(at(2024, 3, 3, 12)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_completions_are_not_lost() {
    const TASKS: u64 = 64;

    let audit = Arc::new(InMemoryAuditLog::new());
    let service = service_with(Arc::new(InMemoryStatsRepo::new()), audit.clone());

    let handles: Vec<_> = (0..TASKS)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .record_completion(CREDENTIAL, "crowd", success(3000 + i as u32))
                    .await
            })
        })
        .collect();

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stats = service.fetch_stats(CREDENTIAL, "crowd").await.unwrap();
    assert_eq!(stats.total_escapes, TASKS);
    assert!(stats.today_escapes <= TASKS);
    assert_eq!(audit.len().unwrap(), TASKS);
}

#[tokio::test]
async fn test_unauthorized_calls_never_touch_store() {
    let repo = Arc::new(CountingRepo::default());
    let service = service_with(repo.clone(), Arc::new(InMemoryAuditLog::new()));

    let missing = service.fetch_stats(None, "alice").await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::MissingCredential);
    assert_eq!(missing.status_code(), 401);

    let wrong = service
        .record_completion(Some("Bearer guess"), "alice", success(1001))
        .await
        .unwrap_err();
    assert_eq!(wrong.kind(), ErrorKind::InvalidCredential);
    assert_eq!(wrong.status_code(), 403);

    let leaderboard = service.leaderboard(Some("Token x"), Some(5)).await.unwrap_err();
    assert_eq!(leaderboard.status_code(), 401);

    assert_eq!(repo.calls(), 0);

    // Invalid input is rejected before storage as well
    let invalid = service.leaderboard(CREDENTIAL, Some(0)).await.unwrap_err();
    assert_eq!(invalid.status_code(), 400);
    assert_eq!(repo.calls(), 0);
}

#[tokio::test]
async fn test_storage_failure_propagates() {
    let audit = Arc::new(InMemoryAuditLog::new());
    let service = service_with(Arc::new(UnavailableRepo), audit.clone());

    let err = service
        .record_completion(CREDENTIAL, "alice", success(1001))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::StorageUnavailable);
    assert_eq!(err.status_code(), 503);

    let err = service.fetch_stats(CREDENTIAL, "alice").await.unwrap_err();
    assert_eq!(err.status_code(), 503);

    let err = service.leaderboard(CREDENTIAL, None).await.unwrap_err();
    assert_eq!(err.status_code(), 503);

    // Nothing was applied, so nothing was audited
    assert!(audit.is_empty().unwrap());
}

#[tokio::test]
async fn test_audit_failure_does_not_fail_completion() {
    let service = service_with(Arc::new(InMemoryStatsRepo::new()), Arc::new(BrokenAudit));
    let mut audit_events = service.subscribe(Topic::Audit);
    let mut stats_events = service.subscribe(Topic::Stats);

    let stats = service
        .record_completion(CREDENTIAL, "alice", success(1001))
        .await
        .unwrap();
    assert_eq!(stats.total_escapes, 1);
    assert_eq!(service.audit_failures(), 1);

    match audit_events.recv().await.unwrap() {
        Event::Audit(AuditEvent::AppendFailed { event, .. }) => {
            assert_eq!(event.loop_id, LoopId(1001));
            assert!(event.success);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    assert!(matches!(
        stats_events.recv().await.unwrap(),
        Event::Stats(StatsEvent::UserCreated { .. })
    ));
    match stats_events.recv().await.unwrap() {
        Event::Stats(StatsEvent::CompletionApplied { stats, .. }) => {
            assert_eq!(stats.total_escapes, 1);
        }
        other => panic!("unexpected event: {:?}", other),
    }

    // The update stands
    let stored = service.fetch_stats(CREDENTIAL, "alice").await.unwrap();
    assert_eq!(stored.total_escapes, 1);
}

#[tokio::test]
async fn test_leaderboard_ordering_and_clamping() {
    let service = StatsService::builder()
        .authorizer(SharedSecretAuthorizer::new(TOKEN))
        .build()
        .unwrap();

    // carol: 3, alice: 1 (created first), bob: 1, dave: 0
    for (user, times) in [("alice", 1), ("bob", 1), ("carol", 3)] {
        for _ in 0..times {
            service
                .record_completion(CREDENTIAL, user, success(2002))
                .await
                .unwrap();
        }
    }
    service.fetch_stats(CREDENTIAL, "dave").await.unwrap();

    let board = service.leaderboard(CREDENTIAL, None).await.unwrap();
    let names: Vec<&str> = board.iter().map(|s| s.user_id.as_str()).collect();
    assert_eq!(names, vec!["carol", "alice", "bob", "dave"]);

    let top = service.leaderboard(CREDENTIAL, Some(2)).await.unwrap();
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].user_id.as_str(), "carol");

    let capped = service.leaderboard(CREDENTIAL, Some(10_000)).await.unwrap();
    assert_eq!(capped.len(), 4);

    for bad in [0, -5] {
        let err = service.leaderboard(CREDENTIAL, Some(bad)).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
    }
}

#[tokio::test]
async fn test_file_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let clock = Arc::new(ManualClock::new(at(2024, 6, 1, 7)));

    let open = |clock: Arc<ManualClock>| {
        StatsService::builder()
            .authorizer(SharedSecretAuthorizer::new(TOKEN))
            .stats_repository(Arc::new(FileStatsRepository::new(temp_dir.path()).unwrap()))
            .audit_repository(Arc::new(
                FileAuditLog::open_or_create(temp_dir.path()).unwrap(),
            ))
            .clock(clock)
            .build()
            .unwrap()
    };

    {
        let service = open(clock.clone());
        service
            .record_completion(CREDENTIAL, "alice", success(1001))
            .await
            .unwrap();
        clock.advance(Duration::days(1));
        service
            .record_completion(CREDENTIAL, "alice", failure(1002))
            .await
            .unwrap();
    }

    let service = open(clock.clone());
    let stats = service.fetch_stats(CREDENTIAL, "alice").await.unwrap();
    assert_eq!(stats.total_escapes, 2);
    assert_eq!(stats.streak, 1);
    assert_eq!(stats.join_date, at(2024, 6, 1, 7));

    let reader = FileAuditLog::open_or_create(temp_dir.path()).unwrap().reader();
    let entries = reader.entries().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].loop_id, LoopId(1001));
    assert!(!entries[1].success);
}

#[tokio::test]
async fn test_loops_fall_back_to_builtin_content() {
    let service = StatsService::builder()
        .authorizer(SharedSecretAuthorizer::new(TOKEN))
        .catalog(escape_content::FileCatalog::new("/nonexistent/loops.ron"))
        .build()
        .unwrap();

    let loops = service.loops().await.unwrap();
    assert!(!loops.is_empty());
    assert!(loops.iter().any(|entry| entry.id == LoopId(1001)));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_first_contact_race_creates_one_record() {
    const USERS: usize = 20;

    let repo = Arc::new(InMemoryStatsRepo::new());
    let service = service_with(repo.clone(), Arc::new(InMemoryAuditLog::new()));
    let mut events = service.subscribe(Topic::Stats);

    let mut handles = Vec::new();
    for i in 0..USERS {
        let user = format!("newcomer-{i}");

        let reader = service.clone();
        let name = user.clone();
        handles.push(tokio::spawn(async move {
            reader.fetch_stats(CREDENTIAL, &name).await.map(|_| ())
        }));

        let writer = service.clone();
        handles.push(tokio::spawn(async move {
            writer
                .record_completion(CREDENTIAL, &user, success(1001))
                .await
                .map(|_| ())
        }));
    }

    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(repo.count().unwrap(), USERS);
    for i in 0..USERS {
        let stats = service
            .fetch_stats(CREDENTIAL, &format!("newcomer-{i}"))
            .await
            .unwrap();
        assert_eq!(stats.total_escapes, 1);
    }

    let mut created = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, Event::Stats(StatsEvent::UserCreated { .. })) {
            created += 1;
        }
    }
    assert_eq!(created, USERS);
}

#[tokio::test]
async fn test_file_store_accepts_longest_user_id() {
    let temp_dir = TempDir::new().unwrap();
    let service = service_with(
        Arc::new(FileStatsRepository::new(temp_dir.path()).unwrap()),
        Arc::new(FileAuditLog::open_or_create(temp_dir.path()).unwrap()),
    );

    let id = "a".repeat(UserId::MAX_LEN);
    let stats = service
        .record_completion(CREDENTIAL, &id, success(1001))
        .await
        .unwrap();
    assert_eq!(stats.total_escapes, 1);
    assert_eq!(stats.user_id.as_str(), id);
}
