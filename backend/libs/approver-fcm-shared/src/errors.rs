use thiserror::Error;

/// Token provider error types
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid service account credential: {0}")]
    Credential(String),

    #[error("failed to sign assertion: {0}")]
    Sign(String),

    #[error("token exchange failed with status {status}: {body}")]
    Exchange { status: u16, body: String },

    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("failed to parse token response: {0}")]
    Response(String),
}

/// Notification dispatch error types
#[derive(Error, Debug)]
pub enum DispatchError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("push delivery failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("push send request failed: {0}")]
    Transport(reqwest::Error),
}
