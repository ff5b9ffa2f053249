//! Centralized Error Handling Module
//!
//! Every failure class gets its own code so a run can be diagnosed from
//! the logs alone.
//!
//! Error codes follow pattern: CATEGORY_SPECIFIC_ERROR
//! - CFG_xxx: Configuration errors (fatal, raised before any account runs)
//! - AUTH_xxx: Login errors (account skipped)
//! - HTTP_xxx: Transport errors (retried, then end of pagination)
//! - SHEET_xxx: Spreadsheet errors (account reported, run continues)
//! - API_xxx: Trigger endpoint errors

use std::fmt;

/// Application-wide error type
#[derive(Debug)]
pub struct AppError {
    /// Unique error code for logging/monitoring
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Optional underlying error
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new AppError
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Create AppError with source error
    pub fn with_source(
        code: ErrorCode,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Get error code as string (for logging)
    pub fn code_str(&self) -> &'static str {
        self.code.as_str()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.as_str(), self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source.as_ref().map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Unique error codes for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // ============================================
    // Configuration Errors
    // ============================================
    /// Config file missing or unreadable
    ConfigMissingFile,
    /// Missing environment variable
    ConfigMissingEnv,
    /// Invalid configuration value
    ConfigInvalidValue,

    // ============================================
    // Authentication Errors
    // ============================================
    /// Login page had no anti-forgery token
    AuthTokenMissing,
    /// Credentials submitted but landing page marker absent
    AuthRejected,

    // ============================================
    // Transport Errors
    // ============================================
    /// Connection failed
    HttpConnectionFailed,
    /// Request timeout
    HttpTimeout,
    /// Non-2xx status
    HttpStatus,
    /// Any other transport error
    HttpError,

    // ============================================
    // Spreadsheet Errors
    // ============================================
    /// A1 range could not be parsed
    SheetInvalidRange,
    /// Output block larger than the account's range
    SheetRangeOverflow,
    /// Clear or write rejected by the Sheets API
    SheetWriteFailed,
    /// No bearer token could be obtained
    SheetAuthFailed,

    // ============================================
    // Notification Errors
    // ============================================
    /// Webhook call failed
    NotificationFailed,

    // ============================================
    // API Errors
    // ============================================
    /// Invalid or missing API key
    ApiUnauthorized,
    /// A run is already in progress
    ApiRunInProgress,
    /// Resource not found
    ApiNotFound,

    // ============================================
    // Generic Errors
    // ============================================
    /// Unknown error
    Unknown,
}

impl ErrorCode {
    /// Get string representation of error code
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigMissingFile => "CFG_MISSING_FILE",
            Self::ConfigMissingEnv => "CFG_MISSING_ENV",
            Self::ConfigInvalidValue => "CFG_INVALID_VALUE",

            Self::AuthTokenMissing => "AUTH_TOKEN_MISSING",
            Self::AuthRejected => "AUTH_REJECTED",

            Self::HttpConnectionFailed => "HTTP_CONNECTION_FAILED",
            Self::HttpTimeout => "HTTP_TIMEOUT",
            Self::HttpStatus => "HTTP_STATUS",
            Self::HttpError => "HTTP_ERROR",

            Self::SheetInvalidRange => "SHEET_INVALID_RANGE",
            Self::SheetRangeOverflow => "SHEET_RANGE_OVERFLOW",
            Self::SheetWriteFailed => "SHEET_WRITE_FAILED",
            Self::SheetAuthFailed => "SHEET_AUTH_FAILED",

            Self::NotificationFailed => "NOTIFICATION_FAILED",

            Self::ApiUnauthorized => "API_UNAUTHORIZED",
            Self::ApiRunInProgress => "API_RUN_IN_PROGRESS",
            Self::ApiNotFound => "API_NOT_FOUND",

            Self::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Get HTTP status code for API responses
    pub fn http_status(&self) -> u16 {
        match self {
            Self::ConfigInvalidValue | Self::SheetInvalidRange => 400,
            Self::ApiUnauthorized => 401,
            Self::ApiNotFound => 404,
            Self::ApiRunInProgress => 409,
            Self::HttpTimeout => 504,
            _ => 500,
        }
    }

    /// Check if error is retryable by the page fetcher
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::HttpConnectionFailed | Self::HttpTimeout | Self::HttpStatus | Self::HttpError
        )
    }
}

// ============================================
// Convenience constructors
// ============================================

impl AppError {
    /// Invalid configuration value
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalidValue, msg)
    }

    /// Missing environment variable
    pub fn missing_env(name: &str) -> Self {
        Self::new(
            ErrorCode::ConfigMissingEnv,
            format!("Missing environment variable: {}", name),
        )
    }

    /// Login token not found
    pub fn token_missing(field: &str) -> Self {
        Self::new(
            ErrorCode::AuthTokenMissing,
            format!("Login form has no '{}' field", field),
        )
    }

    /// Login rejected
    pub fn auth_rejected(username: &str) -> Self {
        Self::new(
            ErrorCode::AuthRejected,
            format!("Login not confirmed for {}", username),
        )
    }

    /// Non-2xx response
    pub fn http_status(status: u16, url: &str) -> Self {
        Self::new(ErrorCode::HttpStatus, format!("HTTP {} from {}", status, url))
    }

    /// Invalid A1 range
    pub fn invalid_range(range: &str) -> Self {
        Self::new(
            ErrorCode::SheetInvalidRange,
            format!("Invalid A1 range: {}", range),
        )
    }

    /// Output larger than the destination range
    pub fn range_overflow(range: &str, capacity: usize, needed: usize) -> Self {
        Self::new(
            ErrorCode::SheetRangeOverflow,
            format!(
                "Range {} holds {} rows but {} are needed",
                range, capacity, needed
            ),
        )
    }

    /// Output wider than the destination range
    pub fn range_too_narrow(range: &str, capacity: usize, width: usize) -> Self {
        Self::new(
            ErrorCode::SheetRangeOverflow,
            format!(
                "Range {} holds {} columns but {} are needed",
                range, capacity, width
            ),
        )
    }

    /// Missing or wrong API key on a guarded endpoint
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::ApiUnauthorized, "Invalid or missing API key")
    }

    /// No route for the requested path
    pub fn not_found(path: &str) -> Self {
        Self::new(ErrorCode::ApiNotFound, format!("No route for {}", path))
    }

    /// Sheets API rejected a call
    pub fn sheet_write(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::SheetWriteFailed, msg)
    }

    /// Webhook failed
    pub fn notification(msg: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotificationFailed, msg)
    }

    /// Run already in progress
    pub fn run_in_progress() -> Self {
        Self::new(ErrorCode::ApiRunInProgress, "A run is already in progress")
    }
}

// ============================================
// Result type alias
// ============================================

/// Application Result type
pub type AppResult<T> = Result<T, AppError>;

// ============================================
// Conversion from common error types
// ============================================

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        Self::new(ErrorCode::Unknown, err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorCode::ConfigMissingFile, "IO error", err)
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::new(ErrorCode::HttpTimeout, "Request timeout")
        } else if err.is_connect() {
            Self::new(ErrorCode::HttpConnectionFailed, "Connection failed")
        } else if let Some(status) = err.status() {
            Self::new(ErrorCode::HttpStatus, format!("HTTP {}", status.as_u16()))
        } else {
            Self::new(ErrorCode::HttpError, err.to_string())
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(ErrorCode::ConfigInvalidValue, "JSON parse error", err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = AppError::auth_rejected("a@b.c");
        assert_eq!(err.code, ErrorCode::AuthRejected);
        assert_eq!(err.code_str(), "AUTH_REJECTED");
        assert_eq!(err.to_string(), "[AUTH_REJECTED] Login not confirmed for a@b.c");
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::HttpTimeout.is_retryable());
        assert!(ErrorCode::HttpStatus.is_retryable());
        assert!(!ErrorCode::AuthRejected.is_retryable());
        assert!(!ErrorCode::SheetWriteFailed.is_retryable());
    }

    #[test]
    fn test_http_status() {
        assert_eq!(ErrorCode::ApiUnauthorized.http_status(), 401);
        assert_eq!(ErrorCode::ApiRunInProgress.http_status(), 409);
        assert_eq!(ErrorCode::SheetWriteFailed.http_status(), 500);
    }

    #[test]
    fn test_overflow_message() {
        let err = AppError::range_overflow("A1:T10", 10, 12);
        assert_eq!(err.code, ErrorCode::SheetRangeOverflow);
        assert!(err.message.contains("10 rows"));

        let err = AppError::range_too_narrow("A1:T10", 20, 22);
        assert_eq!(err.code, ErrorCode::SheetRangeOverflow);
        assert!(err.message.contains("20 columns"));
    }
}
