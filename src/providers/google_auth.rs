//! Bearer tokens for the Sheets API
//!
//! A token is requested for every Sheets call. The service-account source
//! caches the token and refreshes it shortly before expiry, so a long-lived
//! server keeps publishing after the first token has expired.
//!
//! Resolution order in `from_env`:
//! 1. `GOOGLE_APPLICATION_CREDENTIALS` (service-account key file)
//! 2. `SHEETS_ACCESS_TOKEN` (fixed token, for local runs)
//! 3. `service_account.json` in the working directory

use async_trait::async_trait;
use gcp_auth::{CustomServiceAccount, TokenProvider};
use std::path::Path;
use std::sync::Arc;
use tracing::info;

use crate::models::{AppError, AppResult, ErrorCode};
use crate::utils::constants::{
    DEFAULT_SERVICE_ACCOUNT_PATH, ENV_SERVICE_ACCOUNT, ENV_SHEETS_TOKEN, SHEETS_SCOPE,
};

/// Source of `Authorization: Bearer` values
#[async_trait]
pub trait AccessToken: Send + Sync {
    async fn bearer(&self) -> AppResult<String>;
}

/// Token handed in from outside; never refreshed
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

#[async_trait]
impl AccessToken for StaticToken {
    async fn bearer(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

/// Service-account key exchanged for short-lived tokens
pub struct ServiceAccountToken {
    account: CustomServiceAccount,
}

impl ServiceAccountToken {
    pub fn from_file(path: impl AsRef<Path>) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigMissingFile,
                format!("Cannot read service account key {}", path.display()),
                e,
            )
        })?;
        let token = Self::from_json(&raw)?;
        info!("🔑 Sheets auth: service account key {}", path.display());
        Ok(token)
    }

    pub fn from_json(raw: &str) -> AppResult<Self> {
        let account = CustomServiceAccount::from_json(raw).map_err(|e| {
            AppError::with_source(
                ErrorCode::ConfigInvalidValue,
                "Invalid service account key",
                e,
            )
        })?;
        Ok(Self { account })
    }
}

#[async_trait]
impl AccessToken for ServiceAccountToken {
    async fn bearer(&self) -> AppResult<String> {
        let token = self
            .account
            .token(&[SHEETS_SCOPE])
            .await
            .map_err(|e| AppError::with_source(ErrorCode::SheetAuthFailed, "Token exchange failed", e))?;
        Ok(token.as_str().to_string())
    }
}

/// Pick the token source from the environment
pub fn token_from_env() -> AppResult<Arc<dyn AccessToken>> {
    if let Ok(path) = std::env::var(ENV_SERVICE_ACCOUNT) {
        return Ok(Arc::new(ServiceAccountToken::from_file(path)?));
    }

    if let Some(token) = std::env::var(ENV_SHEETS_TOKEN)
        .ok()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
    {
        info!("🔑 Sheets auth: fixed token from {}", ENV_SHEETS_TOKEN);
        return Ok(Arc::new(StaticToken::new(token)));
    }

    if Path::new(DEFAULT_SERVICE_ACCOUNT_PATH).exists() {
        return Ok(Arc::new(ServiceAccountToken::from_file(DEFAULT_SERVICE_ACCOUNT_PATH)?));
    }

    Err(AppError::new(
        ErrorCode::ConfigMissingEnv,
        format!(
            "No Sheets credentials: set {} or {}, or provide {}",
            ENV_SERVICE_ACCOUNT, ENV_SHEETS_TOKEN, DEFAULT_SERVICE_ACCOUNT_PATH
        ),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let token = StaticToken::new("abc");
        assert_eq!(token.bearer().await.unwrap(), "abc");
    }

    #[test]
    fn test_missing_key_file() {
        let err = ServiceAccountToken::from_file("/nonexistent/service_account.json")
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::ConfigMissingFile);
    }

    #[test]
    fn test_malformed_key() {
        let err = ServiceAccountToken::from_json(r#"{"type": "service_account"}"#)
            .err()
            .unwrap();
        assert_eq!(err.code, ErrorCode::ConfigInvalidValue);
    }
}
