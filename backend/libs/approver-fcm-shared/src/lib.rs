/// Approver FCM Shared Library
///
/// This library provides the Firebase Cloud Messaging (FCM) client used to
/// alert reviewers that an approval request is waiting for them.
///
/// It handles:
/// - OAuth2 token generation from a Google service account
/// - Token caching with single-flight refresh
/// - Building the cross-platform approval notification payload
/// - Delivery to a device token, a topic, or the default topic

pub mod client;
pub mod errors;
pub mod models;
pub mod token;

pub use client::FcmClient;
pub use errors::{AuthError, DispatchError};
pub use models::{
    BearerToken, NotificationTarget, RequestSummary, ServiceAccountKey, DEFAULT_TOPIC,
};
pub use token::{TokenProvider, MESSAGING_SCOPE};
