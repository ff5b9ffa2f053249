//! Sheets client against an in-process stand-in for the Sheets API

use async_trait::async_trait;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::Router;
use screen_sync::models::{ErrorCode, SheetRange, SpreadsheetTarget};
use screen_sync::providers::{AccessToken, GoogleSheetsClient, SheetSink};
use screen_sync::{AppError, AppResult};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    uri: String,
    auth: String,
    body: String,
}

type Log = Arc<Mutex<Vec<Seen>>>;

async fn record(
    State(log): State<Log>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    log.lock().unwrap().push(Seen {
        method,
        uri: uri.to_string(),
        auth,
        body,
    });
    StatusCode::OK
}

async fn serve() -> (String, Log) {
    let log: Log = Arc::new(Mutex::new(Vec::new()));
    let app = Router::new().fallback(record).with_state(log.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}/v4/spreadsheets", addr), log)
}

/// Hands out a new token on every call, like a source that refreshes
struct RotatingToken(AtomicU32);

#[async_trait]
impl AccessToken for RotatingToken {
    async fn bearer(&self) -> AppResult<String> {
        Ok(format!("tok-{}", self.0.fetch_add(1, Ordering::SeqCst) + 1))
    }
}

struct BrokenToken;

#[async_trait]
impl AccessToken for BrokenToken {
    async fn bearer(&self) -> AppResult<String> {
        Err(AppError::new(ErrorCode::SheetAuthFailed, "key revoked"))
    }
}

fn target() -> SpreadsheetTarget {
    SpreadsheetTarget {
        url: "https://docs.google.com/spreadsheets/d/SHEET123/edit".into(),
        worksheet: "Sheet2".into(),
    }
}

#[tokio::test]
async fn test_each_call_uses_a_fresh_token() {
    let (base, log) = serve().await;
    let client = GoogleSheetsClient::new(&target(), Arc::new(RotatingToken(AtomicU32::new(0))))
        .unwrap()
        .with_api_base(base);
    let range: SheetRange = "A1:T6000".parse().unwrap();
    let rows = vec![vec!["Name".to_string(), "=HYPERLINK(\"u\", \"n\")".to_string()]];

    client.clear(&range).await.unwrap();
    client.write(&range, &rows).await.unwrap();

    let seen = log.lock().unwrap().clone();
    assert_eq!(seen.len(), 2);

    assert_eq!(seen[0].method, Method::POST);
    assert_eq!(seen[0].uri, "/v4/spreadsheets/SHEET123/values:batchClear");
    assert_eq!(seen[0].auth, "Bearer tok-1");
    let clear: serde_json::Value = serde_json::from_str(&seen[0].body).unwrap();
    assert_eq!(clear["ranges"][0], "'Sheet2'!A1:T6000");

    assert_eq!(seen[1].method, Method::PUT);
    assert!(seen[1].uri.starts_with("/v4/spreadsheets/SHEET123/values/"));
    assert!(seen[1].uri.ends_with("?valueInputOption=USER_ENTERED"));
    assert_eq!(seen[1].auth, "Bearer tok-2");
    let write: serde_json::Value = serde_json::from_str(&seen[1].body).unwrap();
    assert_eq!(write["majorDimension"], "ROWS");
    assert_eq!(write["values"][0][1], "=HYPERLINK(\"u\", \"n\")");
}

#[tokio::test]
async fn test_token_failure_sends_nothing() {
    let (base, log) = serve().await;
    let client = GoogleSheetsClient::new(&target(), Arc::new(BrokenToken))
        .unwrap()
        .with_api_base(base);
    let range: SheetRange = "A1:T6000".parse().unwrap();

    let err = client.clear(&range).await.unwrap_err();

    assert_eq!(err.code, ErrorCode::SheetAuthFailed);
    assert!(log.lock().unwrap().is_empty());
}
