use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use approver_store::{RequestStatus, RequestStore};

use crate::error::WatchError;

/// Terminal result of a watch operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOutcome {
    Approved,
    Rejected,
    NotFound,
    TimedOut,
}

impl fmt::Display for WatchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WatchOutcome::Approved => write!(f, "approved"),
            WatchOutcome::Rejected => write!(f, "rejected"),
            WatchOutcome::NotFound => write!(f, "not found"),
            WatchOutcome::TimedOut => write!(f, "timed out"),
        }
    }
}

/// Poll cadence and wait budget for a watch
#[derive(Debug, Clone)]
pub struct WatchOptions {
    pub poll_interval: Duration,
    pub timeout_budget: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            timeout_budget: Duration::from_secs(300),
        }
    }
}

/// Observer for watch progress
///
/// Receives `elapsed / timeout_budget`, clamped to `[0, 1]`, after each
/// poll. Reporting never affects the watch itself.
pub trait ProgressSink: Send + Sync {
    fn report(&self, fraction: f64);
}

/// Default sink: logs the fraction.
pub struct LogProgress;

impl ProgressSink for LogProgress {
    fn report(&self, fraction: f64) {
        debug!(percent = fraction * 100.0, "waiting for decision");
    }
}

/// Polls the record store until a request leaves `pending`, disappears,
/// or the wait budget runs out.
pub struct StatusWatcher<S> {
    store: Arc<S>,
    progress: Arc<dyn ProgressSink>,
}

impl<S: RequestStore> StatusWatcher<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self {
            store,
            progress: Arc::new(LogProgress),
        }
    }

    pub fn with_progress(mut self, sink: Arc<dyn ProgressSink>) -> Self {
        self.progress = sink;
        self
    }

    /// Watches without an external cancellation signal.
    pub async fn watch(
        &self,
        request_id: &str,
        options: &WatchOptions,
    ) -> Result<WatchOutcome, WatchError> {
        self.watch_with_cancel(request_id, options, CancellationToken::new())
            .await
    }

    /// Watches until a decision, disappearance, exhausted budget, or
    /// cancellation, whichever comes first.
    ///
    /// The first read happens immediately, so an already-decided or absent
    /// record returns without sleeping. The cancellation token is honored
    /// at every wait boundary. Elapsed time is measured against the clock,
    /// never accumulated from sleep lengths.
    pub async fn watch_with_cancel(
        &self,
        request_id: &str,
        options: &WatchOptions,
        cancel: CancellationToken,
    ) -> Result<WatchOutcome, WatchError> {
        let started = Instant::now();

        match self.store.fetch(request_id).await? {
            None => return Ok(WatchOutcome::NotFound),
            Some(record) => {
                if let Some(outcome) = decision(record.status) {
                    return Ok(outcome);
                }
            }
        }

        loop {
            if started.elapsed() >= options.timeout_budget {
                info!(request_id, "watch budget exhausted, request still pending");
                return Ok(WatchOutcome::TimedOut);
            }

            tokio::select! {
                _ = cancel.cancelled() => return Err(WatchError::Cancelled),
                _ = tokio::time::sleep(options.poll_interval) => {}
            }

            match self.store.fetch(request_id).await? {
                None => return Ok(WatchOutcome::NotFound),
                Some(record) => {
                    if let Some(outcome) = decision(record.status) {
                        info!(request_id, %outcome, "request decided");
                        return Ok(outcome);
                    }
                }
            }

            self.progress
                .report(progress_fraction(started.elapsed(), options.timeout_budget));
        }
    }
}

fn decision(status: RequestStatus) -> Option<WatchOutcome> {
    match status {
        RequestStatus::Pending => None,
        RequestStatus::Approved => Some(WatchOutcome::Approved),
        RequestStatus::Rejected => Some(WatchOutcome::Rejected),
    }
}

fn progress_fraction(elapsed: Duration, budget: Duration) -> f64 {
    if budget.is_zero() {
        return 1.0;
    }
    (elapsed.as_secs_f64() / budget.as_secs_f64()).clamp(0.0, 1.0)
}
