//! Constants Module - Single Source of Truth
//!
//! All site markers, endpoints and pipeline defaults live here.
//! Other modules read them through `RunSettings` so they can be overridden
//! from the config file.

// ============================================
// APPLICATION CONSTANTS
// ============================================

/// Application name
pub const APP_NAME: &str = "ScreenSync";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================
// TARGET SITE
// ============================================

/// Origin of the screening site; relative links are prefixed with it
pub const DEFAULT_BASE_URL: &str = "https://www.screener.in";

/// Login form path (GET for the token, POST for the credentials)
pub const LOGIN_PATH: &str = "/login/";

/// Name of the hidden anti-forgery input on the login form
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Text that only appears on the authenticated landing page
pub const DEFAULT_LOGIN_MARKER: &str = "Core Watchlist";

/// Text that only appears when another results page exists
pub const DEFAULT_NEXT_MARKER: &str = "Next";

/// Browser-like User-Agent sent with the login form
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// Placeholder replaced by the page number in screen URL templates
pub const PAGE_PLACEHOLDER: &str = "{}";

/// Timeout for a single request against the target site (seconds)
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

// ============================================
// PIPELINE DEFAULTS
// ============================================

/// Attempts per page before the account's pagination stops
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 10;

/// Fixed pause between attempts (milliseconds)
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// Pause between two successful pages (milliseconds)
pub const DEFAULT_PAGE_DELAY_MS: u64 = 700;

/// Pause before the completion webhook is called (milliseconds)
pub const DEFAULT_NOTIFY_DELAY_MS: u64 = 10_000;

/// Non-enriched screens keep only this many leading columns
pub const DEFAULT_COLUMN_LIMIT: usize = 18;

// ============================================
// ENRICHMENT
// ============================================

/// Cell index holding the value that drives the classification band
pub const CLASSIFICATION_SOURCE_INDEX: usize = 5;

/// Cell index holding the company name anchor
pub const NAME_LINK_INDEX: usize = 1;

/// Header of the appended classification column
pub const CLASSIFICATION_HEADER: &str = "Classification";

/// Header of the appended hyperlink column
pub const HYPERLINK_HEADER: &str = "Hyperlink";

/// Magnitude-only column whose sign is reinstated for display
pub const NEGATED_COLUMN: &str = "Down  %";

// ============================================
// SPREADSHEET
// ============================================

/// Google Sheets REST endpoint
pub const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";

/// Worksheet used when the config does not name one
pub const DEFAULT_WORKSHEET: &str = "Sheet2";

/// OAuth scope requested for service-account tokens
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

/// Timeout for Sheets API and webhook calls (seconds)
pub const DEFAULT_API_TIMEOUT_SECS: u64 = 60;

// ============================================
// ENVIRONMENT
// ============================================

/// Path of the JSON config file
pub const ENV_CONFIG_PATH: &str = "SCREEN_SYNC_CONFIG";

/// Default config file name
pub const DEFAULT_CONFIG_PATH: &str = "screen_sync.json";

/// Fixed OAuth bearer token for the Sheets API
pub const ENV_SHEETS_TOKEN: &str = "SHEETS_ACCESS_TOKEN";

/// Service-account key file for the Sheets API
pub const ENV_SERVICE_ACCOUNT: &str = "GOOGLE_APPLICATION_CREDENTIALS";

/// Key file looked up when neither variable is set
pub const DEFAULT_SERVICE_ACCOUNT_PATH: &str = "service_account.json";

/// Optional key protecting the run trigger
pub const ENV_API_KEY: &str = "SCREEN_SYNC_API_KEY";

/// Server bind host
pub const ENV_HOST: &str = "SCREEN_SYNC_HOST";

/// Server port; the platform `PORT` wins when both are set
pub const ENV_PORT: &str = "SCREEN_SYNC_PORT";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

/// Render the screen URL for a page number.
pub fn page_url(template: &str, page: u32) -> String {
    template.replacen(PAGE_PLACEHOLDER, &page.to_string(), 1)
}

/// Join the site origin with a relative link.
pub fn absolute_link(base_url: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    format!("{}{}", base_url.trim_end_matches('/'), href)
}
