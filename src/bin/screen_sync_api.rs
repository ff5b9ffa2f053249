//! Screen Sync API Server
//!
//! Keeps the process alive and runs the scrape on demand.
//!
//! Usage:
//!   cargo run --bin screen_sync_api
//!
//! Environment:
//!   SCREEN_SYNC_PORT    - Server port (default: 8080, `PORT` takes precedence)
//!   SCREEN_SYNC_HOST    - Server host (default: 0.0.0.0)
//!   SCREEN_SYNC_API_KEY - Required `X-API-Key` on /run when set
//!   GOOGLE_APPLICATION_CREDENTIALS - Service-account key file for the Sheets API
//!   RUST_LOG            - Log filter (default: info)

use screen_sync::api::{create_router, AppState};
use screen_sync::utils::constants::{
    APP_NAME, APP_VERSION, DEFAULT_HOST, DEFAULT_PORT, ENV_HOST, ENV_PORT,
};
use screen_sync::{AccountRunner, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    print_banner();

    // Fail at startup on a bad config rather than on the first trigger
    let config = AppConfig::from_env()?;
    let runner = AccountRunner::from_config(&config)?;
    info!("📋 Loaded {} account(s)", config.accounts.len());

    let state = Arc::new(AppState::from_env(Arc::new(runner)));
    if state.api_key.is_none() {
        warn!("⚠️ No API key configured, /run is open");
    }

    let app = create_router(state);

    // Hosting platforms set PORT; SCREEN_SYNC_PORT is for local runs
    let host = std::env::var(ENV_HOST).unwrap_or_else(|_| DEFAULT_HOST.to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var(ENV_PORT))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🚀 {} API starting on http://{}", APP_NAME, addr);
    info!("");
    info!("Endpoints:");
    info!("  GET  /         - Liveness message");
    info!("  GET  /health   - Health check");
    info!("  GET  /run      - Start a scrape in the background");
    info!("  GET  /status   - Last run report");
    info!("");
    info!("Press Ctrl+C for graceful shutdown");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 {} API shutdown complete", APP_NAME);

    Ok(())
}

fn print_banner() {
    println!(
        r#"
    ╔══════════════════════════════════════════════╗
    ║                                              ║
    ║      S C R E E N   S Y N C   v{:<8}       ║
    ║      screener.in  ->  Google Sheets          ║
    ║                                              ║
    ╚══════════════════════════════════════════════╝
    "#,
        APP_VERSION
    );
}
