use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use approval_client::{ProgressSink, StatusWatcher, WatchError, WatchOptions, WatchOutcome};
use approver_store::{
    ApprovalRequest, MemoryRequestStore, NewApprovalRequest, RequestStatus, RequestStore,
    StoreError,
};

fn vacation_request() -> NewApprovalRequest {
    NewApprovalRequest {
        title: "Vacation request".to_string(),
        description: "Requesting time off for personal vacation".to_string(),
        requester_id: "user1".to_string(),
        requester_email: "user1@example.com".to_string(),
    }
}

fn options(poll_secs: u64, budget_secs: u64) -> WatchOptions {
    WatchOptions {
        poll_interval: Duration::from_secs(poll_secs),
        timeout_budget: Duration::from_secs(budget_secs),
    }
}

#[tokio::test(start_paused = true)]
async fn test_already_decided_record_returns_without_sleeping() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();
    assert!(store.decide(&record.id, RequestStatus::Approved).await);

    let watcher = StatusWatcher::new(store);
    let started = Instant::now();
    let outcome = watcher.watch(&record.id, &options(1, 300)).await.unwrap();

    assert_eq!(outcome, WatchOutcome::Approved);
    // No timer fired: on a paused clock, any sleep would be visible.
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_absent_record_is_not_found_without_sleeping() {
    let store = Arc::new(MemoryRequestStore::new());
    let watcher = StatusWatcher::new(store);

    let started = Instant::now();
    let outcome = watcher.watch("no-such-id", &options(1, 300)).await.unwrap();

    assert_eq!(outcome, WatchOutcome::NotFound);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_undecided_watch_times_out_within_one_interval_of_budget() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let watcher = StatusWatcher::new(store);
    let started = Instant::now();
    let outcome = watcher.watch(&record.id, &options(1, 3)).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert!(elapsed >= Duration::from_secs(3), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(4), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_zero_budget_times_out_immediately() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let watcher = StatusWatcher::new(store);
    let started = Instant::now();
    let outcome = watcher.watch(&record.id, &options(1, 0)).await.unwrap();

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn test_decision_on_second_poll_returns_early() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let reviewer_store = store.clone();
    let request_id = record.id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(reviewer_store.decide(&request_id, RequestStatus::Rejected).await);
    });

    let watcher = StatusWatcher::new(store);
    let started = Instant::now();
    let outcome = watcher.watch(&record.id, &options(1, 3)).await.unwrap();
    let elapsed = started.elapsed();

    // The decision lands between the first and second poll, so the watch
    // observes it on the second one instead of burning the whole budget.
    assert_eq!(outcome, WatchOutcome::Rejected);
    assert!(elapsed >= Duration::from_secs(2), "elapsed {elapsed:?}");
    assert!(elapsed < Duration::from_secs(3), "elapsed {elapsed:?}");
}

#[tokio::test(start_paused = true)]
async fn test_record_disappearing_mid_watch_is_not_found() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let remover_store = store.clone();
    let request_id = record.id.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(remover_store.remove(&request_id).await);
    });

    let watcher = StatusWatcher::new(store);
    let outcome = watcher.watch(&record.id, &options(1, 300)).await.unwrap();
    assert_eq!(outcome, WatchOutcome::NotFound);
}

struct RecordingSink(Mutex<Vec<f64>>);

impl ProgressSink for RecordingSink {
    fn report(&self, fraction: f64) {
        self.0.lock().unwrap().push(fraction);
    }
}

#[tokio::test(start_paused = true)]
async fn test_progress_is_monotonic_and_clamped() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let sink = Arc::new(RecordingSink(Mutex::new(Vec::new())));
    let watcher = StatusWatcher::new(store).with_progress(sink.clone());
    watcher.watch(&record.id, &options(1, 3)).await.unwrap();

    let fractions = sink.0.lock().unwrap().clone();
    assert!(!fractions.is_empty());
    for pair in fractions.windows(2) {
        assert!(pair[1] >= pair[0], "progress went backwards: {fractions:?}");
    }
    for fraction in &fractions {
        assert!((0.0..=1.0).contains(fraction));
    }
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_interrupts_the_wait() {
    let store = Arc::new(MemoryRequestStore::new());
    let record = store.create(vacation_request()).await.unwrap();

    let cancel = CancellationToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(1500)).await;
        handle.cancel();
    });

    let watcher = StatusWatcher::new(store);
    let started = Instant::now();
    let err = watcher
        .watch_with_cancel(&record.id, &options(10, 300), cancel)
        .await
        .unwrap_err();

    assert!(matches!(err, WatchError::Cancelled));
    // Cancellation is honored at the wait boundary, long before the budget.
    assert!(started.elapsed() < Duration::from_secs(2));
}

struct FailingStore;

#[async_trait]
impl RequestStore for FailingStore {
    async fn create(&self, _request: NewApprovalRequest) -> Result<ApprovalRequest, StoreError> {
        Err(StoreError::Backend("store unavailable".to_string()))
    }

    async fn fetch(&self, _id: &str) -> Result<Option<ApprovalRequest>, StoreError> {
        Err(StoreError::Backend("read timed out".to_string()))
    }
}

#[tokio::test]
async fn test_read_failure_is_not_conflated_with_absence() {
    let watcher = StatusWatcher::new(Arc::new(FailingStore));
    let err = watcher
        .watch("req-1", &WatchOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, WatchError::Store(_)));
}
