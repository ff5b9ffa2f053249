//! ScreenSync Library
//!
//! Logs into screener.in under several accounts, scrapes each account's
//! saved screen page by page and writes the results into fixed ranges of a
//! shared Google Sheet:
//! - Cookie sessions with anti-forgery token login
//! - Fixed-interval retry per page
//! - Classification band + hyperlink enrichment for flagged accounts
//! - Clear-then-write publishing into non-overlapping ranges
//! - Completion webhook

pub mod api;
pub mod core;
pub mod models;
pub mod providers;
pub mod utils;

pub use crate::core::{AccountRunner, Paginator, RowEnricher, RunJob, SheetPublisher};
pub use models::{AccountConfig, AppConfig, AppError, AppResult, ErrorCode, RunReport, RunSettings};
pub use providers::{GoogleSheetsClient, ScreenerSite, WebhookNotifier};
