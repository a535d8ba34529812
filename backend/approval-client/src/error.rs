use thiserror::Error;

use approver_fcm_shared::{AuthError, DispatchError};
use approver_store::StoreError;

pub type AppResult<T> = Result<T, AppError>;

/// Watch failure, distinct from every terminal `WatchOutcome`
///
/// A failed store read is reported here instead of being folded into
/// `NotFound`: the record may well still exist.
#[derive(Error, Debug)]
pub enum WatchError {
    #[error("store read failed: {0}")]
    Store(#[from] StoreError),

    #[error("watch cancelled")]
    Cancelled,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("watch error: {0}")]
    Watch(#[from] WatchError),
}
