use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use tokio::sync::Mutex;
use tracing::debug;

use crate::errors::AuthError;
use crate::models::{BearerToken, GoogleTokenResponse, JwtClaims, ServiceAccountKey};

/// OAuth2 scope granting access to the push-messaging API.
pub const MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Validity window of the signed assertion, in seconds.
const ASSERTION_TTL_SECS: i64 = 3600;

/// A cached token is refreshed once it has less than this much life left.
const TOKEN_SAFETY_MARGIN_SECS: i64 = 60;

/// Exchanges a service account credential for short-lived bearer tokens
///
/// Tokens are cached in-process and reused until the safety margin runs
/// out. The cache lock is held across a refresh, so concurrent callers of
/// an expired cache trigger exactly one exchange.
pub struct TokenProvider {
    credentials: Arc<ServiceAccountKey>,
    http_client: reqwest::Client,
    cache: Mutex<Option<BearerToken>>,
}

impl TokenProvider {
    pub fn new(credentials: Arc<ServiceAccountKey>) -> Self {
        Self {
            credentials,
            http_client: reqwest::Client::new(),
            cache: Mutex::new(None),
        }
    }

    /// Returns a bearer token with at least the safety margin of validity
    /// left, refreshing synchronously when the cached one is stale.
    pub async fn bearer_token(&self) -> Result<BearerToken, AuthError> {
        let mut cache = self.cache.lock().await;
        if let Some(token) = cache.as_ref() {
            if token.is_fresh(Utc::now(), Duration::seconds(TOKEN_SAFETY_MARGIN_SECS)) {
                return Ok(token.clone());
            }
        }

        let token = self.refresh().await?;
        *cache = Some(token.clone());
        Ok(token)
    }

    async fn refresh(&self) -> Result<BearerToken, AuthError> {
        let assertion = self.sign_assertion(Utc::now())?;
        let response = self.exchange(&assertion).await?;
        debug!(
            expires_in = response.expires_in,
            account = %self.credentials.client_email,
            "exchanged signed assertion for access token"
        );

        Ok(BearerToken {
            value: response.access_token,
            expires_at: Utc::now() + Duration::seconds(response.expires_in),
            scope: MESSAGING_SCOPE.to_string(),
        })
    }

    /// Claims for the self-signed assertion. Issuer and subject are both
    /// the service account; the audience is the token endpoint itself.
    fn assertion_claims(&self, now: DateTime<Utc>) -> JwtClaims {
        let iat = now.timestamp();
        JwtClaims {
            iss: self.credentials.client_email.clone(),
            sub: self.credentials.client_email.clone(),
            scope: MESSAGING_SCOPE.to_string(),
            aud: self.credentials.token_uri.clone(),
            exp: iat + ASSERTION_TTL_SECS,
            iat,
        }
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, AuthError> {
        let claims = self.assertion_claims(now);
        let key = EncodingKey::from_rsa_pem(self.credentials.private_key.as_bytes())
            .map_err(|e| AuthError::Credential(format!("failed to parse private key: {e}")))?;

        encode(&Header::new(Algorithm::RS256), &claims, &key)
            .map_err(|e| AuthError::Sign(e.to_string()))
    }

    async fn exchange(&self, assertion: &str) -> Result<GoogleTokenResponse, AuthError> {
        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion),
        ];

        let response = self
            .http_client
            .post(&self.credentials.token_uri)
            .form(&params)
            .send()
            .await?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json()
            .await
            .map_err(|e| AuthError::Response(e.to_string()))
    }
}
