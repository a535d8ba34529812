use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle state of an approval request
///
/// A request starts `Pending` and transitions exactly once, to `Approved`
/// or `Rejected`. It never reverts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Whether the status is a final decision.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

/// An approval request document, as stored in the record store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequest {
    pub id: String,
    pub title: String,
    pub description: String,
    pub requester_id: String,
    pub requester_email: String,
    pub created_at: DateTime<Utc>,
    pub status: RequestStatus,
}

/// Payload for creating a new approval request
///
/// The store assigns `id`, `createdAt` and the initial `pending` status.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewApprovalRequest {
    pub title: String,
    pub description: String,
    pub requester_id: String,
    pub requester_email: String,
}

const SAMPLE_TITLES: &[&str] = &[
    "Expense reimbursement",
    "Vacation request",
    "Equipment purchase",
    "Client meeting",
    "Project budget approval",
    "Training request",
    "Overtime approval",
    "Software license purchase",
];

const SAMPLE_DESCRIPTIONS: &[&str] = &[
    "Need approval for expenses incurred during client visit",
    "Requesting time off for personal vacation",
    "New laptop needed for development work",
    "Meeting with important clients requires pre-approval",
    "Project XYZ requires additional budget allocation",
    "Professional development course on machine learning",
    "Overtime hours for project completion",
    "Annual renewal of software licenses",
];

impl NewApprovalRequest {
    /// Rotating sample request, for seeding test data.
    pub fn sample(n: usize) -> Self {
        Self {
            title: SAMPLE_TITLES[n % SAMPLE_TITLES.len()].to_string(),
            description: SAMPLE_DESCRIPTIONS[n % SAMPLE_DESCRIPTIONS.len()].to_string(),
            requester_id: format!("user{}", n % 5 + 1),
            requester_email: format!("user{}@example.com", n % 5 + 1),
        }
    }
}
