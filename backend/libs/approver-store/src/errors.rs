use thiserror::Error;

/// Record store error types
///
/// A read that fails is reported here; it is never folded into the
/// "record absent" case, which `RequestStore::fetch` expresses as `Ok(None)`.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),

    #[error("failed to decode record: {0}")]
    Serialization(#[from] serde_json::Error),
}
