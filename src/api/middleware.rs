//! API Middleware (Auth, Logging)

use axum::{
    extract::{Json, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::handlers::AppState;
use super::types::{ApiError, ApiResponse};

pub const API_KEY_HEADER: &str = "X-API-Key";

/// API key check for the run trigger. No configured key means open access.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let Some(expected) = state.api_key.as_deref() else {
        return next.run(request).await;
    };

    let api_key = headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok());

    match api_key {
        Some(key) if key == expected => return next.run(request).await,
        Some(_) => warn!("Invalid API key attempted"),
        None => warn!("Missing API key on {}", request.uri().path()),
    }

    (
        StatusCode::UNAUTHORIZED,
        Json(ApiResponse::error(
            ApiError::unauthorized(),
            start.elapsed().as_secs_f64() * 1000.0,
        )),
    )
        .into_response()
}

/// Request logging middleware
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();

    let response = next.run(request).await;

    let latency = start.elapsed();
    let status = response.status();

    info!(
        method = %method,
        uri = %uri,
        status = %status.as_u16(),
        latency_ms = %latency.as_millis(),
        "Request completed"
    );

    response
}
