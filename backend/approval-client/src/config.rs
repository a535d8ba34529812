use std::env;
use std::time::Duration;

use dotenvy::dotenv;

use approver_fcm_shared::{NotificationTarget, ServiceAccountKey};

use crate::error::AppError;

/// Client configuration, sourced from the environment
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the service account key file; when absent, credentials come
    /// from `FIREBASE_*` variables instead.
    pub credentials_path: Option<String>,
    pub default_target: NotificationTarget,
    pub poll_interval: Duration,
    pub watch_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let credentials_path = env::var("FIREBASE_CREDENTIALS_PATH").ok();

        let device_token = env::var("APPROVER_DEVICE_TOKEN")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let topic = env::var("APPROVER_TOPIC")
            .ok()
            .filter(|v| !v.trim().is_empty());
        let default_target = NotificationTarget::from_flags(device_token, topic);

        let poll_interval = parse_secs("APPROVER_POLL_INTERVAL_SECS", 5)?;
        let watch_timeout = parse_secs("APPROVER_WATCH_TIMEOUT_SECS", 300)?;
        if poll_interval.is_zero() {
            return Err(AppError::Config(
                "APPROVER_POLL_INTERVAL_SECS must be positive".into(),
            ));
        }

        Ok(Self {
            credentials_path,
            default_target,
            poll_interval,
            watch_timeout,
        })
    }

    /// Loads the service account, preferring the configured key file and
    /// falling back to `FIREBASE_*` variables.
    pub fn credentials(&self) -> Result<ServiceAccountKey, AppError> {
        match &self.credentials_path {
            Some(path) => Ok(ServiceAccountKey::from_file(path)?),
            None => Ok(ServiceAccountKey::from_env()?),
        }
    }

    /// Watch options derived from the configured cadence and budget.
    pub fn watch_options(&self) -> crate::services::watcher::WatchOptions {
        crate::services::watcher::WatchOptions {
            poll_interval: self.poll_interval,
            timeout_budget: self.watch_timeout,
        }
    }
}

fn parse_secs(name: &str, default_secs: u64) -> Result<Duration, AppError> {
    match env::var(name) {
        Ok(value) => value
            .parse::<u64>()
            .map(Duration::from_secs)
            .map_err(|_| AppError::Config(format!("{name} must be an integer number of seconds"))),
        Err(_) => Ok(Duration::from_secs(default_secs)),
    }
}
