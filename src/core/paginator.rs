//! Paginated fetch of one account's screen
//!
//! ```text
//! FETCHING -> EXTRACTING -> (enrich | truncate) -> APPENDING -> FETCHING
//!    |            |                                   |
//!    +------------+------------> STOPPED <------------+ (no "Next" marker)
//! ```
//!
//! A failed fetch or a page without a table stops the account but keeps
//! every page gathered so far.

use std::time::Duration;
use tracing::{info, warn};

use super::aggregator::Aggregator;
use super::enricher::RowEnricher;
use super::extractor::extract_table;
use crate::models::{AccountConfig, AppResult, OutputBlock, RunSettings};
use crate::providers::{PageFetcher, PageTransport};
use crate::utils::constants::page_url;

/// True when the page links to a further page
pub fn has_next_page(body: &str, marker: &str) -> bool {
    body.contains(marker)
}

/// Why pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Retries exhausted on this page
    FetchFailed { page: u32 },
    /// This page had no table
    NoTable { page: u32 },
    /// This page had no next-page marker
    LastPage { page: u32 },
}

/// Pages gathered for one account
#[derive(Debug, Clone)]
pub struct Pagination {
    pub block: OutputBlock,
    pub stop: StopReason,
}

#[derive(Debug, Clone)]
pub struct Paginator {
    fetcher: PageFetcher,
    enricher: RowEnricher,
    next_marker: String,
    page_delay: Duration,
}

impl Paginator {
    pub fn new(
        fetcher: PageFetcher,
        enricher: RowEnricher,
        next_marker: impl Into<String>,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            enricher,
            next_marker: next_marker.into(),
            page_delay,
        }
    }

    pub fn from_settings(settings: &RunSettings) -> Self {
        Self::new(
            PageFetcher::from_settings(settings),
            RowEnricher::from_settings(settings),
            settings.next_marker.clone(),
            settings.page_delay(),
        )
    }

    /// Walk pages 1.. until a stop condition. Only a range overflow is an error.
    pub async fn run<T>(&self, transport: &T, account: &AccountConfig) -> AppResult<Pagination>
    where
        T: PageTransport + ?Sized,
    {
        let mut aggregator = Aggregator::new(&account.range);
        let mut page: u32 = 1;

        let stop = loop {
            let url = page_url(&account.url_template, page);
            let Some(body) = self.fetcher.fetch(transport, &url).await else {
                warn!("⚠️ Skipping page {} due to repeated failures", page);
                break StopReason::FetchFailed { page };
            };

            let Some(table) = extract_table(&body) else {
                warn!("⚠️ No table on page {}. Ending scraping", page);
                break StopReason::NoTable { page };
            };

            aggregator.push_page(self.enricher.shape(table, account.enrich))?;
            info!("✅ Page {} scraped ({})", page, account.username());

            if !has_next_page(&body, &self.next_marker) {
                break StopReason::LastPage { page };
            }
            page += 1;
            tokio::time::sleep(self.page_delay).await;
        };

        Ok(Pagination {
            block: aggregator.finish(),
            stop,
        })
    }
}
