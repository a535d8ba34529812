use std::sync::Arc;

use tracing::{error, info};
use uuid::Uuid;

use crate::errors::DispatchError;
use crate::models::{
    AndroidConfig, AndroidNotification, ApnsConfig, ApnsHeaders, ApnsPayload, ApprovalData, Aps,
    ApsAlert, FcmApiResponse, FcmMessage, FcmMessageBody, FcmNotification, NotificationTarget,
    RequestSummary, ServiceAccountKey,
};
use crate::token::TokenProvider;

const FCM_ENDPOINT: &str = "https://fcm.googleapis.com";

const MESSAGE_TYPE: &str = "approval_request";
const ANDROID_CHANNEL_ID: &str = "approver_channel";
const CLICK_ACTION: &str = "FLUTTER_NOTIFICATION_CLICK";
const APNS_CATEGORY: &str = "APPROVAL_REQUEST";

/// Firebase Cloud Messaging client
///
/// Builds and sends the cross-platform notification that tells a reviewer
/// an approval request is waiting. Delivery is a single JSON POST; there is
/// no automatic retry, the caller owns resilience policy.
pub struct FcmClient {
    project_id: String,
    tokens: TokenProvider,
    http_client: reqwest::Client,
    endpoint: String,
}

impl FcmClient {
    /// Creates a client for the project named in the service account key.
    pub fn new(credentials: ServiceAccountKey) -> Self {
        let credentials = Arc::new(credentials);
        Self {
            project_id: credentials.project_id.clone(),
            tokens: TokenProvider::new(credentials),
            http_client: reqwest::Client::new(),
            endpoint: FCM_ENDPOINT.to_string(),
        }
    }

    /// Overrides the delivery endpoint. Tests point this at a local server.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Sends the approval notification for `request_id` to the resolved
    /// target. Returns the server-assigned message name.
    pub async fn send_approval_request(
        &self,
        request_id: &str,
        summary: &RequestSummary,
        target: &NotificationTarget,
    ) -> Result<String, DispatchError> {
        let token = self.tokens.bearer_token().await?;
        let message = Self::build_message(request_id, summary, target);

        let url = format!(
            "{}/v1/projects/{}/messages:send",
            self.endpoint, self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token.value))
            .json(&message)
            .send()
            .await
            .map_err(DispatchError::Transport)?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            error!(%status, request_id, "push delivery rejected");
            return Err(DispatchError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let name = response
            .json::<FcmApiResponse>()
            .await
            .ok()
            .and_then(|r| r.name)
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        info!(request_id, message_name = %name, "push notification sent");
        Ok(name)
    }

    /// Builds the message for one approval request.
    ///
    /// The `data` block is what lets the approver app render approve/reject
    /// controls and correlate the tap back to the record. The android tag
    /// makes repeated notifications for the same request collapse.
    fn build_message(
        request_id: &str,
        summary: &RequestSummary,
        target: &NotificationTarget,
    ) -> FcmMessage {
        let notification = FcmNotification {
            title: "New Approval Request".to_string(),
            body: format!("Please review the request from {}", summary.requester_email),
        };

        let (token, topic) = target.split();

        FcmMessage {
            message: FcmMessageBody {
                token,
                topic,
                data: ApprovalData {
                    kind: MESSAGE_TYPE.to_string(),
                    request_id: request_id.to_string(),
                    title: summary.title.clone(),
                    description: summary.description.clone(),
                    requester_email: summary.requester_email.clone(),
                    created_at: summary.created_at.timestamp().to_string(),
                    click_action: CLICK_ACTION.to_string(),
                },
                android: AndroidConfig {
                    priority: "high".to_string(),
                    notification: AndroidNotification {
                        channel_id: ANDROID_CHANNEL_ID.to_string(),
                        tag: request_id.to_string(),
                        click_action: CLICK_ACTION.to_string(),
                    },
                },
                apns: ApnsConfig {
                    headers: ApnsHeaders {
                        priority: "10".to_string(),
                    },
                    payload: ApnsPayload {
                        aps: Aps {
                            alert: ApsAlert {
                                title: notification.title.clone(),
                                body: notification.body.clone(),
                            },
                            badge: 1,
                            sound: "default".to_string(),
                            category: APNS_CATEGORY.to_string(),
                            mutable_content: 1,
                        },
                        request_id: request_id.to_string(),
                    },
                },
                notification,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn summary() -> RequestSummary {
        RequestSummary {
            title: "Vacation request".to_string(),
            description: "Requesting time off for personal vacation".to_string(),
            requester_email: "user1@example.com".to_string(),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_message_prefers_device_token_over_topic() {
        let target =
            NotificationTarget::from_flags(Some("T1".to_string()), Some("topicA".to_string()));
        let message = FcmClient::build_message("req-1", &summary(), &target);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["message"]["token"], "T1");
        assert!(json["message"].get("topic").is_none());
    }

    #[test]
    fn test_message_falls_back_to_default_topic() {
        let message =
            FcmClient::build_message("req-42", &summary(), &NotificationTarget::DefaultTopic);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(json["message"]["topic"], "approval_requests");
        assert!(json["message"].get("token").is_none());
    }

    #[test]
    fn test_message_data_correlates_to_request() {
        let message =
            FcmClient::build_message("req-42", &summary(), &NotificationTarget::DefaultTopic);
        let json = serde_json::to_value(&message).unwrap();

        let data = &json["message"]["data"];
        assert_eq!(data["type"], "approval_request");
        assert_eq!(data["requestId"], "req-42");
        assert_eq!(data["requesterEmail"], "user1@example.com");
        assert_eq!(data["createdAt"], "1700000000");
        assert_eq!(data["click_action"], "FLUTTER_NOTIFICATION_CLICK");
    }

    #[test]
    fn test_message_android_block_collapses_by_request() {
        let message =
            FcmClient::build_message("req-42", &summary(), &NotificationTarget::DefaultTopic);
        let json = serde_json::to_value(&message).unwrap();

        let android = &json["message"]["android"];
        assert_eq!(android["priority"], "high");
        assert_eq!(android["notification"]["tag"], "req-42");
        assert_eq!(android["notification"]["channel_id"], "approver_channel");
    }

    #[test]
    fn test_message_apns_block_enables_actions() {
        let message =
            FcmClient::build_message("req-7", &summary(), &NotificationTarget::DefaultTopic);
        let json = serde_json::to_value(&message).unwrap();

        let apns = &json["message"]["apns"];
        assert_eq!(apns["headers"]["apns-priority"], "10");
        assert_eq!(apns["payload"]["aps"]["category"], "APPROVAL_REQUEST");
        assert_eq!(apns["payload"]["aps"]["badge"], 1);
        assert_eq!(apns["payload"]["aps"]["sound"], "default");
        assert_eq!(apns["payload"]["aps"]["mutable-content"], 1);
        assert_eq!(apns["payload"]["request_id"], "req-7");
        assert_eq!(apns["payload"]["aps"]["alert"]["title"], "New Approval Request");
    }

    #[test]
    fn test_notification_body_names_requester() {
        let message =
            FcmClient::build_message("req-1", &summary(), &NotificationTarget::DefaultTopic);
        let json = serde_json::to_value(&message).unwrap();

        assert_eq!(
            json["message"]["notification"]["body"],
            "Please review the request from user1@example.com"
        );
    }
}
