//! Screen Sync - one-shot run
//!
//! Logs into every configured screener.in account, scrapes its screen and
//! publishes the rows into the account's spreadsheet range, then exits.
//!
//! Environment:
//!   SCREEN_SYNC_CONFIG             - Path of the JSON config (default: screen_sync.json)
//!   GOOGLE_APPLICATION_CREDENTIALS - Service-account key file for the Sheets API
//!   SHEETS_ACCESS_TOKEN            - Fixed bearer token, used when no key file is set
//!   RUST_LOG                       - Log filter (default: info)

use eyre::Result;
use screen_sync::utils::constants::{APP_NAME, APP_VERSION};
use screen_sync::{AccountRunner, AppConfig};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    info!("📊 {} v{}", APP_NAME, APP_VERSION);

    let config = AppConfig::from_env()?;
    info!("📋 Loaded {} account(s)", config.accounts.len());

    let runner = AccountRunner::from_config(&config)?;
    let report = runner.run().await;

    println!("{}", serde_json::to_string_pretty(&report)?);

    if report.published_count() == 0 && !report.accounts.is_empty() {
        error!("❌ No account was published");
        std::process::exit(1);
    }

    Ok(())
}
