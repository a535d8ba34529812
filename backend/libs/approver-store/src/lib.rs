/// Approver Store Shared Library
///
/// This library defines the approval request document model and the
/// `RequestStore` interface to the external record store.
///
/// It handles:
/// - The request lifecycle (`pending` -> `approved`/`rejected`)
/// - Create-with-generated-id and read-by-id operations
/// - An in-memory store for tests and local development

pub mod errors;
pub mod models;
pub mod store;

pub use errors::StoreError;
pub use models::{ApprovalRequest, NewApprovalRequest, RequestStatus};
pub use store::{MemoryRequestStore, RequestStore};
