use std::sync::Arc;

use tracing::info;

use approver_fcm_shared::{FcmClient, NotificationTarget, RequestSummary};
use approver_store::{ApprovalRequest, NewApprovalRequest, RequestStore};

use crate::error::AppResult;
use crate::services::watcher::{StatusWatcher, WatchOptions, WatchOutcome};

fn summary_of(request: &ApprovalRequest) -> RequestSummary {
    RequestSummary {
        title: request.title.clone(),
        description: request.description.clone(),
        requester_email: request.requester_email.clone(),
        created_at: request.created_at,
    }
}

/// Create / notify / watch composition over an injected store and push client
pub struct ApprovalFlow<S> {
    store: Arc<S>,
    push: Arc<FcmClient>,
}

impl<S: RequestStore> ApprovalFlow<S> {
    pub fn new(store: Arc<S>, push: Arc<FcmClient>) -> Self {
        Self { store, push }
    }

    /// Creates a request record; the store assigns id and timestamp.
    pub async fn create(&self, request: NewApprovalRequest) -> AppResult<ApprovalRequest> {
        let record = self.store.create(request).await?;
        info!(request_id = %record.id, title = %record.title, "approval request created");
        Ok(record)
    }

    /// Alerts a reviewer about an existing request. Returns the push
    /// message name.
    pub async fn notify(
        &self,
        request: &ApprovalRequest,
        target: &NotificationTarget,
    ) -> AppResult<String> {
        let name = self
            .push
            .send_approval_request(&request.id, &summary_of(request), target)
            .await?;
        Ok(name)
    }

    /// Creates a request and waits for its decision.
    pub async fn create_and_watch(
        &self,
        request: NewApprovalRequest,
        options: &WatchOptions,
    ) -> AppResult<(ApprovalRequest, WatchOutcome)> {
        let record = self.create(request).await?;
        let outcome = self.watcher().watch(&record.id, options).await?;
        Ok((record, outcome))
    }

    /// Creates a request, alerts a reviewer, then waits for the decision.
    ///
    /// A dispatch failure aborts the flow; the created record stays in the
    /// store untouched.
    pub async fn create_notify_watch(
        &self,
        request: NewApprovalRequest,
        target: &NotificationTarget,
        options: &WatchOptions,
    ) -> AppResult<(ApprovalRequest, WatchOutcome)> {
        let record = self.create(request).await?;
        self.notify(&record, target).await?;
        let outcome = self.watcher().watch(&record.id, options).await?;
        Ok((record, outcome))
    }

    fn watcher(&self) -> StatusWatcher<S> {
        StatusWatcher::new(self.store.clone())
    }
}
