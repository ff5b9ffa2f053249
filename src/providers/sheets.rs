//! Google Sheets v4 client
//!
//! Only the two calls the publisher needs: clear a range and write a block
//! of rows into a range with formula interpretation (`USER_ENTERED`).
//!
//! API: https://sheets.googleapis.com/v4/spreadsheets/{id}/values/...
//! Auth: bearer token fetched per call from an `AccessToken` source

use async_trait::async_trait;
use reqwest::Url;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::google_auth::{token_from_env, AccessToken};
use crate::models::{AppError, AppResult, Row, SheetRange, SpreadsheetTarget};
use crate::utils::constants::{DEFAULT_API_TIMEOUT_SECS, SHEETS_API_BASE};

/// Destination of the output blocks
#[async_trait]
pub trait SheetSink: Send + Sync {
    /// Blank every cell in the range
    async fn clear(&self, range: &SheetRange) -> AppResult<()>;

    /// Write rows starting at the range's top-left cell
    async fn write(&self, range: &SheetRange, rows: &[Row]) -> AppResult<()>;
}

#[derive(Debug, Serialize)]
struct BatchClearRequest<'a> {
    ranges: Vec<&'a str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: &'a [Row],
}

/// `'Sheet 2'!A1:T6000`; quotes inside the name are doubled
pub fn qualified_range(worksheet: &str, range: &SheetRange) -> String {
    format!("'{}'!{}", worksheet.replace('\'', "''"), range.a1())
}

/// Bearer-authenticated Sheets client bound to one worksheet
pub struct GoogleSheetsClient {
    client: reqwest::Client,
    token: Arc<dyn AccessToken>,
    api_base: String,
    spreadsheet_id: String,
    worksheet: String,
}

impl GoogleSheetsClient {
    pub fn new(target: &SpreadsheetTarget, token: Arc<dyn AccessToken>) -> AppResult<Self> {
        let spreadsheet_id = target.spreadsheet_id()?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_API_TIMEOUT_SECS))
            .build()?;

        info!(
            "📗 Sheets target: spreadsheet {} / worksheet '{}'",
            spreadsheet_id, target.worksheet
        );

        Ok(Self {
            client,
            token,
            api_base: SHEETS_API_BASE.to_string(),
            spreadsheet_id,
            worksheet: target.worksheet.clone(),
        })
    }

    /// Build with the credentials found in the environment
    pub fn from_env(target: &SpreadsheetTarget) -> AppResult<Self> {
        Self::new(target, token_from_env()?)
    }

    /// Point at another `.../v4/spreadsheets` root
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    fn endpoint(&self, tail: &[&str]) -> AppResult<Url> {
        let mut url = Url::parse(&self.api_base)
            .map_err(|e| AppError::invalid_config(format!("Bad Sheets endpoint: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::invalid_config("Sheets endpoint cannot take a path"))?
            .push(&self.spreadsheet_id)
            .extend(tail);
        Ok(url)
    }

    async fn check(response: reqwest::Response, action: &str, range: &str) -> AppResult<()> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        let snippet: String = body.chars().take(300).collect();
        Err(AppError::sheet_write(format!(
            "{} {} failed with HTTP {}: {}",
            action,
            range,
            status.as_u16(),
            snippet
        )))
    }
}

#[async_trait]
impl SheetSink for GoogleSheetsClient {
    async fn clear(&self, range: &SheetRange) -> AppResult<()> {
        let qualified = qualified_range(&self.worksheet, range);
        let url = self.endpoint(&["values:batchClear"])?;
        let token = self.token.bearer().await?;
        debug!("🧽 Clearing {}", qualified);

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&BatchClearRequest {
                ranges: vec![qualified.as_str()],
            })
            .send()
            .await
            .map_err(|e| AppError::sheet_write(format!("Clear {} failed: {}", qualified, e)))?;
        Self::check(response, "Clear", &qualified).await
    }

    async fn write(&self, range: &SheetRange, rows: &[Row]) -> AppResult<()> {
        let qualified = qualified_range(&self.worksheet, range);
        let mut url = self.endpoint(&["values", qualified.as_str()])?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        let token = self.token.bearer().await?;
        debug!("✍️ Writing {} rows to {}", rows.len(), qualified);

        let response = self
            .client
            .put(url)
            .bearer_auth(token)
            .json(&ValueRange {
                range: &qualified,
                major_dimension: "ROWS",
                values: rows,
            })
            .send()
            .await
            .map_err(|e| AppError::sheet_write(format!("Write {} failed: {}", qualified, e)))?;
        Self::check(response, "Write", &qualified).await
    }
}
