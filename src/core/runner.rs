//! Account runner - one full pass over every configured account
//!
//! Strictly sequential: one account, one page, one request at a time. Each
//! account gets a fresh session that is dropped when the account is done.
//! Login failures skip the account; publish failures are reported and the
//! next account still runs. The webhook fires once at the end either way.

use async_trait::async_trait;
use tracing::{error, info, warn};

use super::paginator::Paginator;
use super::publisher::SheetPublisher;
use crate::models::{
    AccountConfig, AccountOutcome, AccountReport, AppConfig, AppResult, RunReport,
    RunSettings,
};
use crate::providers::{GoogleSheetsClient, Notifier, ScreenSite, ScreenerSite, SheetSink, WebhookNotifier};

/// A complete run that can be handed to a background task
#[async_trait]
pub trait RunJob: Send + Sync {
    async fn run(&self) -> RunReport;
}

pub struct AccountRunner<S: ScreenSite, K: SheetSink> {
    site: S,
    sink: K,
    notifier: Option<Box<dyn Notifier>>,
    accounts: Vec<AccountConfig>,
    settings: RunSettings,
}

impl AccountRunner<ScreenerSite, GoogleSheetsClient> {
    /// Production wiring: screener.in, Google Sheets, optional webhook
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let site = ScreenerSite::new(&config.settings);
        let sink = GoogleSheetsClient::from_env(&config.spreadsheet)?;
        let mut runner = Self::new(site, sink, config.accounts.clone(), config.settings.clone());

        if let Some(url) = &config.notify_url {
            runner = runner.with_notifier(Box::new(WebhookNotifier::new(url.clone())?));
        }
        Ok(runner)
    }
}

impl<S: ScreenSite, K: SheetSink> AccountRunner<S, K> {
    pub fn new(site: S, sink: K, accounts: Vec<AccountConfig>, settings: RunSettings) -> Self {
        Self {
            site,
            sink,
            notifier: None,
            accounts,
            settings,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Scrape and publish every account, then notify
    pub async fn run(&self) -> RunReport {
        let mut report = RunReport::start();
        info!("🚀 Run {} started ({} accounts)", report.run_id, self.accounts.len());

        for (idx, account) in self.accounts.iter().enumerate() {
            info!("🚀 Scraping Account {}: {}", idx + 1, account.username());
            let outcome = self.run_account(account).await;
            report.accounts.push(AccountReport {
                username: account.username().to_string(),
                range: account.range.clone(),
                outcome,
            });
        }

        report.notified = self.notify().await;
        report.finish();
        info!("🏁 {}", report.summary());
        report
    }

    async fn run_account(&self, account: &AccountConfig) -> AccountOutcome {
        let session = match self.site.login(&account.credentials).await {
            Ok(session) => session,
            Err(e) => {
                error!("❌ Login failed for {}: {}", account.username(), e);
                return AccountOutcome::LoginFailed {
                    reason: e.to_string(),
                };
            }
        };

        let paginator = Paginator::from_settings(&self.settings);
        // Pagination only fails when the block outgrows the range
        let pagination = match paginator.run(&session, account).await {
            Ok(p) => p,
            Err(e) => {
                error!("❌ {} not published: {}", account.username(), e);
                return AccountOutcome::RangeOverflow {
                    reason: e.to_string(),
                };
            }
        };
        drop(session);

        let block = pagination.block;
        info!(
            "📦 {}: {} page(s), {} data rows ({:?})",
            account.username(),
            block.pages,
            block.data_rows(),
            pagination.stop
        );

        match SheetPublisher::new(&self.sink).publish(&account.range, &block).await {
            Ok(()) => AccountOutcome::Published {
                pages: block.pages,
                rows: block.len(),
            },
            Err(e) => {
                error!("❌ Sheet update failed for {}: {}", account.username(), e);
                AccountOutcome::PublishFailed {
                    pages: block.pages,
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Fire the completion webhook; failures are only logged
    async fn notify(&self) -> bool {
        let Some(notifier) = &self.notifier else {
            return false;
        };

        info!("🔔 Triggering completion webhook...");
        tokio::time::sleep(self.settings.notify_delay()).await;

        match notifier.notify().await {
            Ok(()) => true,
            Err(e) => {
                warn!("❌ Webhook failed: {}", e);
                false
            }
        }
    }
}

#[async_trait]
impl<S, K> RunJob for AccountRunner<S, K>
where
    S: ScreenSite + 'static,
    K: SheetSink + 'static,
{
    async fn run(&self) -> RunReport {
        AccountRunner::run(self).await
    }
}
