//! Page fetcher with fixed-interval retry
//!
//! Every transport failure (connection, timeout, non-2xx) is retried after
//! the same pause. Exhaustion, or an error that is not a transport failure,
//! is reported as `None`, which the paginator treats as the end of the
//! account's results.

use std::time::Duration;
use tracing::{debug, error, warn};

use super::session::PageTransport;
use crate::models::RunSettings;

#[derive(Debug, Clone)]
pub struct PageFetcher {
    max_attempts: u32,
    delay: Duration,
}

impl PageFetcher {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(settings.retry_attempts, settings.retry_delay())
    }

    /// First successful body, or `None` after `max_attempts` failures
    pub async fn fetch<T>(&self, transport: &T, url: &str) -> Option<String>
    where
        T: PageTransport + ?Sized,
    {
        for attempt in 1..=self.max_attempts {
            match transport.get_text(url).await {
                Ok(body) => {
                    debug!("📄 Fetched {} ({} bytes, attempt {})", url, body.len(), attempt);
                    return Some(body);
                }
                Err(e) if !e.code.is_retryable() => {
                    error!("❌ Giving up on {}: {}", url, e);
                    return None;
                }
                Err(e) if attempt < self.max_attempts => {
                    warn!(
                        "[Retry {}/{}] {}. Waiting {}ms...",
                        attempt,
                        self.max_attempts,
                        e,
                        self.delay.as_millis()
                    );
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => {
                    error!("❌ Failed after {} attempts: {}", self.max_attempts, e);
                }
            }
        }
        None
    }
}
