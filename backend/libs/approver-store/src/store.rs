use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::errors::StoreError;
use crate::models::{ApprovalRequest, NewApprovalRequest, RequestStatus};

/// Interface to the external approval request store
///
/// Implementations are keyed collections of `ApprovalRequest` documents
/// addressable by id.
#[async_trait]
pub trait RequestStore: Send + Sync {
    /// Creates a request with a generated id and server-assigned timestamp.
    /// Status starts at `pending`.
    async fn create(&self, request: NewApprovalRequest) -> Result<ApprovalRequest, StoreError>;

    /// Reads a request by id.
    ///
    /// `Ok(None)` means the record is confirmed absent. A failed read is
    /// `Err(StoreError)` and must not be treated as absence.
    async fn fetch(&self, id: &str) -> Result<Option<ApprovalRequest>, StoreError>;
}

/// In-memory request store for tests and local development
///
/// Also carries the reviewer-side operations (`decide`, `remove`) that in
/// production happen out-of-band in the approver app.
#[derive(Default)]
pub struct MemoryRequestStore {
    records: RwLock<HashMap<String, ApprovalRequest>>,
}

impl MemoryRequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a reviewer decision on a pending request.
    ///
    /// Returns `false` when the record is absent, already decided, or the
    /// decision is not terminal. A decided record never changes again.
    pub async fn decide(&self, id: &str, decision: RequestStatus) -> bool {
        if !decision.is_terminal() {
            return false;
        }
        let mut records = self.records.write().await;
        match records.get_mut(id) {
            Some(record) if record.status == RequestStatus::Pending => {
                record.status = decision;
                debug!(request_id = %id, status = ?decision, "recorded decision");
                true
            }
            _ => false,
        }
    }

    /// Deletes a record. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        self.records.write().await.remove(id).is_some()
    }

    /// Creates `count` sample requests.
    pub async fn seed(&self, count: usize) -> Result<Vec<ApprovalRequest>, StoreError> {
        let mut created = Vec::with_capacity(count);
        for n in 0..count {
            created.push(self.create(NewApprovalRequest::sample(n)).await?);
        }
        Ok(created)
    }
}

#[async_trait]
impl RequestStore for MemoryRequestStore {
    async fn create(&self, request: NewApprovalRequest) -> Result<ApprovalRequest, StoreError> {
        let record = ApprovalRequest {
            id: Uuid::new_v4().to_string(),
            title: request.title,
            description: request.description,
            requester_id: request.requester_id,
            requester_email: request.requester_email,
            created_at: Utc::now(),
            status: RequestStatus::Pending,
        };

        let mut records = self.records.write().await;
        records.insert(record.id.clone(), record.clone());
        debug!(request_id = %record.id, title = %record.title, "created approval request");
        Ok(record)
    }

    async fn fetch(&self, id: &str) -> Result<Option<ApprovalRequest>, StoreError> {
        Ok(self.records.read().await.get(id).cloned())
    }
}
