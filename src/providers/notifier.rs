//! Completion webhook
//!
//! Fired once after every account has been processed. Failures are logged
//! by the caller and never change the outcome of the run.

use async_trait::async_trait;
use std::time::Duration;
use tracing::info;

use crate::models::{AppError, AppResult};
use crate::utils::constants::DEFAULT_API_TIMEOUT_SECS;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self) -> AppResult<()>;
}

/// Plain `GET` to a fixed URL; anything but 200 is a failure
pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: impl Into<String>) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self) -> AppResult<()> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::notification(format!("Webhook request failed: {}", e)))?;

        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(AppError::notification(format!(
                "Webhook returned HTTP {}",
                status.as_u16()
            )));
        }

        info!("🔔 Webhook triggered successfully");
        Ok(())
    }
}
