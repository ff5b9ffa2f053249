//! Authenticated sessions against the screening site
//!
//! Login is a two-step form exchange: GET the login page for the
//! anti-forgery token, POST the token with the credentials. The site returns
//! no structured status, so success is read off the landing page body.

use async_trait::async_trait;
use lazy_static::lazy_static;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use scraper::{Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::models::{AppError, AppResult, Credentials, RunSettings};
use crate::utils::constants::{
    BROWSER_USER_AGENT, CSRF_FIELD, DEFAULT_HTTP_TIMEOUT_SECS, LOGIN_PATH,
};

lazy_static! {
    static ref CSRF_SELECTOR: Selector =
        Selector::parse(&format!("input[name=\"{}\"]", CSRF_FIELD)).unwrap();
}

/// Single GET of a page body over some session
#[async_trait]
pub trait PageTransport: Send + Sync {
    /// Body of a 2xx response; any other outcome is an error
    async fn get_text(&self, url: &str) -> AppResult<String>;
}

/// A site accounts can log into
#[async_trait]
pub trait ScreenSite: Send + Sync {
    type Session: PageTransport;

    /// Open a fresh session for one account. Never retried.
    async fn login(&self, credentials: &Credentials) -> AppResult<Self::Session>;
}

/// True when the body is the authenticated landing page
pub fn is_logged_in(body: &str, marker: &str) -> bool {
    body.contains(marker)
}

/// Value of the hidden anti-forgery input, if the page has one
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    document
        .select(&CSRF_SELECTOR)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(String::from)
}

/// Cookie-carrying client bound to one account
pub struct Session {
    client: reqwest::Client,
}

#[async_trait]
impl PageTransport for Session {
    async fn get_text(&self, url: &str) -> AppResult<String> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::http_status(status.as_u16(), url));
        }
        Ok(response.text().await?)
    }
}

/// screener.in login flow
pub struct ScreenerSite {
    base_url: String,
    login_marker: String,
    timeout: Duration,
}

impl ScreenerSite {
    pub fn new(settings: &RunSettings) -> Self {
        Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            login_marker: settings.login_marker.clone(),
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    fn login_url(&self) -> String {
        format!("{}{}", self.base_url, LOGIN_PATH)
    }

    /// One client per account so cookies never leak between accounts
    fn build_client(&self) -> AppResult<reqwest::Client> {
        reqwest::Client::builder()
            .cookie_store(true)
            .gzip(true)
            .timeout(self.timeout)
            .build()
            .map_err(AppError::from)
    }

    fn form_headers(&self) -> AppResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        let referer = HeaderValue::from_str(&self.login_url())
            .map_err(|_| AppError::invalid_config(format!("Bad base URL: {}", self.base_url)))?;
        headers.insert(REFERER, referer);
        Ok(headers)
    }
}

#[async_trait]
impl ScreenSite for ScreenerSite {
    type Session = Session;

    async fn login(&self, credentials: &Credentials) -> AppResult<Session> {
        let client = self.build_client()?;
        let login_url = self.login_url();

        debug!("🔐 Fetching login form for {}", credentials.username);
        let form_page = client.get(&login_url).send().await?.text().await?;
        let token = extract_csrf_token(&form_page).ok_or_else(|| AppError::token_missing(CSRF_FIELD))?;

        let form = [
            (CSRF_FIELD, token.as_str()),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.as_str()),
            ("next", ""),
        ];
        let landing = client
            .post(&login_url)
            .headers(self.form_headers()?)
            .form(&form)
            .send()
            .await?
            .text()
            .await?;

        if !is_logged_in(&landing, &self.login_marker) {
            warn!("❌ Login marker not found for {}", credentials.username);
            return Err(AppError::auth_rejected(&credentials.username));
        }

        info!("✅ Logged in as {}", credentials.username);
        Ok(Session { client })
    }
}
