//! API Request/Response Types

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{AppError, RunReport};

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    pub latency_ms: f64,
    pub timestamp: i64,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T, latency_ms: f64) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            latency_ms,
            timestamp: Utc::now().timestamp(),
        }
    }
}

impl ApiResponse<()> {
    pub fn error(error: ApiError, latency_ms: f64) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            latency_ms,
            timestamp: Utc::now().timestamp(),
        }
    }
}

/// API Error
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn unauthorized() -> Self {
        AppError::unauthorized().into()
    }
}

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self {
            code: err.code_str().to_string(),
            message: err.message,
        }
    }
}

// ============================================
// Liveness
// ============================================

#[derive(Debug, Serialize)]
pub struct MessageData {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct HealthData {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================
// Runs
// ============================================

#[derive(Debug, Serialize)]
pub struct RunStartedData {
    pub status: String,
    pub accepted_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct StatusData {
    pub running: bool,
    pub runs_completed: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_run: Option<RunReport>,
}
