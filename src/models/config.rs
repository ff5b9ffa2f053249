//! Configuration module for ScreenSync
//!
//! Accounts, the destination spreadsheet and pipeline tuning are read from a
//! JSON file whose path comes from `SCREEN_SYNC_CONFIG`. Defaults come from
//! `utils/constants.rs`.

use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use super::errors::{AppError, AppResult, ErrorCode};
use super::types::SheetRange;
use crate::utils::constants::{
    DEFAULT_BASE_URL, DEFAULT_COLUMN_LIMIT, DEFAULT_CONFIG_PATH, DEFAULT_LOGIN_MARKER,
    DEFAULT_NEXT_MARKER, DEFAULT_NOTIFY_DELAY_MS, DEFAULT_PAGE_DELAY_MS, DEFAULT_RETRY_ATTEMPTS,
    DEFAULT_RETRY_DELAY_MS, DEFAULT_WORKSHEET, ENV_CONFIG_PATH, PAGE_PLACEHOLDER,
};

/// Login identity for one account
#[derive(Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<hidden>")
            .finish()
    }
}

/// One account and the screen it scrapes
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
    #[serde(flatten)]
    pub credentials: Credentials,
    /// Screen URL with `{}` where the page number goes
    #[serde(alias = "url")]
    pub url_template: String,
    /// Destination range in the shared worksheet
    pub range: SheetRange,
    /// Append Classification and Hyperlink columns
    #[serde(default, alias = "add_classification")]
    pub enrich: bool,
}

impl AccountConfig {
    pub fn username(&self) -> &str {
        &self.credentials.username
    }
}

/// Pipeline tuning; every field has a default
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunSettings {
    /// Origin of the screening site
    pub base_url: String,
    /// Text proving the login succeeded
    pub login_marker: String,
    /// Text proving another page exists
    pub next_marker: String,
    /// Attempts per page
    pub retry_attempts: u32,
    /// Fixed pause between attempts
    pub retry_delay_ms: u64,
    /// Pause between successful pages
    pub page_delay_ms: u64,
    /// Pause before the completion webhook
    pub notify_delay_ms: u64,
    /// Columns kept for non-enriched screens
    pub column_limit: usize,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            login_marker: DEFAULT_LOGIN_MARKER.to_string(),
            next_marker: DEFAULT_NEXT_MARKER.to_string(),
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            notify_delay_ms: DEFAULT_NOTIFY_DELAY_MS,
            column_limit: DEFAULT_COLUMN_LIMIT,
        }
    }
}

impl RunSettings {
    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    pub fn notify_delay(&self) -> Duration {
        Duration::from_millis(self.notify_delay_ms)
    }

    /// Settings with every pause removed, for tests and dry runs
    pub fn without_delays(mut self) -> Self {
        self.retry_delay_ms = 0;
        self.page_delay_ms = 0;
        self.notify_delay_ms = 0;
        self
    }
}

/// Destination spreadsheet
#[derive(Debug, Clone, Deserialize)]
pub struct SpreadsheetTarget {
    /// Browser URL of the spreadsheet
    #[serde(rename = "spreadsheet_url")]
    pub url: String,
    /// Worksheet (tab) name
    #[serde(default = "default_worksheet")]
    pub worksheet: String,
}

fn default_worksheet() -> String {
    DEFAULT_WORKSHEET.to_string()
}

impl SpreadsheetTarget {
    /// Spreadsheet ID from a `.../spreadsheets/d/<id>/edit` URL
    pub fn spreadsheet_id(&self) -> AppResult<String> {
        self.url
            .split("/spreadsheets/d/")
            .nth(1)
            .and_then(|rest| rest.split(['/', '?', '#']).next())
            .filter(|id| !id.is_empty())
            .map(String::from)
            .ok_or_else(|| {
                AppError::invalid_config(format!("No spreadsheet ID in URL: {}", self.url))
            })
    }
}

/// Full process configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(flatten)]
    pub spreadsheet: SpreadsheetTarget,
    /// Webhook called once every account is done
    #[serde(default)]
    pub notify_url: Option<String>,
    #[serde(default)]
    pub settings: RunSettings,
    pub accounts: Vec<AccountConfig>,
}

impl AppConfig {
    /// Load from the path in `SCREEN_SYNC_CONFIG` (default `screen_sync.json`)
    pub fn from_env() -> AppResult<Self> {
        let path = std::env::var(ENV_CONFIG_PATH).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigMissingFile,
                format!("Cannot read config file {}", path.display()),
                e,
            )
        })?;
        let config = Self::from_json(&raw)?;
        info!(
            "⚙️ Loaded {} account(s) from {}",
            config.accounts.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse and validate config JSON
    pub fn from_json(raw: &str) -> AppResult<Self> {
        let config: AppConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> AppResult<()> {
        if self.accounts.is_empty() {
            return Err(AppError::invalid_config("No accounts configured"));
        }
        self.spreadsheet.spreadsheet_id()?;

        if self.settings.retry_attempts == 0 {
            return Err(AppError::invalid_config("retry_attempts must be at least 1"));
        }

        for (i, account) in self.accounts.iter().enumerate() {
            if account.username().is_empty() {
                return Err(AppError::invalid_config(format!(
                    "Account #{} has no username",
                    i + 1
                )));
            }
            if !account.url_template.contains(PAGE_PLACEHOLDER) {
                return Err(AppError::invalid_config(format!(
                    "URL for {} has no '{}' page placeholder",
                    account.username(),
                    PAGE_PLACEHOLDER
                )));
            }
            for other in &self.accounts[i + 1..] {
                if account.range.overlaps(&other.range) {
                    return Err(AppError::invalid_config(format!(
                        "Ranges {} ({}) and {} ({}) overlap",
                        account.range,
                        account.username(),
                        other.range,
                        other.username()
                    )));
                }
            }
        }
        Ok(())
    }
}
