//! API Request Handlers

use axum::{
    extract::{Json, State},
    http::{StatusCode, Uri},
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::guard::RunGuard;
use super::types::*;
use crate::core::RunJob;
use crate::models::{AppError, RunReport};
use crate::utils::constants::{APP_VERSION, ENV_API_KEY};

type ApiFailure = (StatusCode, Json<ApiResponse<()>>);

/// Shared application state
pub struct AppState {
    pub job: Arc<dyn RunJob>,
    pub guard: RunGuard,
    pub last_report: RwLock<Option<RunReport>>,
    pub runs_completed: AtomicU64,
    pub api_key: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(job: Arc<dyn RunJob>, api_key: Option<String>) -> Self {
        Self {
            job,
            guard: RunGuard::new(),
            last_report: RwLock::new(None),
            runs_completed: AtomicU64::new(0),
            api_key: api_key.filter(|k| !k.is_empty()),
            start_time: Instant::now(),
        }
    }

    /// API key from `SCREEN_SYNC_API_KEY`; unset leaves `/run` open
    pub fn from_env(job: Arc<dyn RunJob>) -> Self {
        Self::new(job, std::env::var(ENV_API_KEY).ok())
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    async fn record(&self, report: RunReport) {
        *self.last_report.write().await = Some(report);
        self.runs_completed.fetch_add(1, Ordering::SeqCst);
    }
}

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

fn failure(err: AppError, start: Instant) -> ApiFailure {
    let status = StatusCode::from_u16(err.code.http_status())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(ApiResponse::error(err.into(), elapsed_ms(start))))
}

// ============================================
// Liveness
// ============================================

pub async fn home() -> Json<ApiResponse<MessageData>> {
    let start = Instant::now();
    Json(ApiResponse::success(
        MessageData {
            message: "Scraper is alive!".to_string(),
        },
        elapsed_ms(start),
    ))
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Runs
// ============================================

/// Start a run in the background; 409 while one is already in flight
pub async fn trigger_run(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<ApiResponse<RunStartedData>>), ApiFailure> {
    let start = Instant::now();

    let Some(permit) = state.guard.try_acquire() else {
        warn!("⏳ Run requested while another is still in progress");
        return Err(failure(AppError::run_in_progress(), start));
    };

    let task_state = state.clone();
    tokio::spawn(async move {
        let report = task_state.job.run().await;
        info!("📋 Background run finished: {}", report.summary());
        task_state.record(report).await;
        drop(permit);
    });

    info!("🚀 Background run accepted");
    let data = RunStartedData {
        status: "started".to_string(),
        accepted_at: chrono::Utc::now(),
    };
    Ok((StatusCode::ACCEPTED, Json(ApiResponse::success(data, elapsed_ms(start)))))
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatusData>> {
    let start = Instant::now();

    let data = StatusData {
        running: state.guard.is_running(),
        runs_completed: state.runs_completed.load(Ordering::SeqCst),
        last_run: state.last_report.read().await.clone(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

pub async fn not_found(uri: Uri) -> ApiFailure {
    failure(AppError::not_found(uri.path()), Instant::now())
}
