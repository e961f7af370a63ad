//! Fetch collaborator: the seam between the orchestrator and whatever
//! actually retrieves a page
//!
//! The orchestrator does not know or care how a page gets rendered; it
//! talks to the [`Fetcher`] trait. [`HttpFetcher`] is the plain HTTP
//! implementation used by the CLI. A browser-automation backend would
//! implement the same trait and honor the rendering fields of
//! [`RenderOptions`] that HTTP fetching ignores.

use crate::config::FetchDefaults;
use crate::crawler::parser::parse_page;
use crate::state::{ElementCounts, FetchErrorKind};
use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Browser identity catalog, keyed the way callers select them
pub const USER_AGENTS: &[(&str, &str)] = &[
    (
        "chrome-windows",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ),
    (
        "chrome-mac",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    ),
    (
        "firefox",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    ),
    (
        "safari",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
    ),
    (
        "mobile-android",
        "Mozilla/5.0 (Linux; Android 10; SM-G981B) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/80.0.3987.162 Mobile Safari/537.36",
    ),
    (
        "mobile-iphone",
        "Mozilla/5.0 (iPhone; CPU iPhone OS 14_6 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.0 Mobile/15E148 Safari/604.1",
    ),
];

/// Resolves a catalog key to a user-agent string
///
/// Unknown keys fall back to `chrome-windows`.
pub fn resolve_user_agent(key: &str) -> &'static str {
    USER_AGENTS
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| USER_AGENTS.first())
        .map(|(_, ua)| *ua)
        .unwrap_or_default()
}

fn default_user_agent_key() -> String {
    "chrome-windows".to_string()
}

fn default_true() -> bool {
    true
}

fn default_wait_time() -> f64 {
    2.0
}

fn default_page_load_timeout() -> u64 {
    30
}

/// Per-fetch rendering options
///
/// `headless`, `disable_images` and `wait_time` only matter to rendering
/// backends; the HTTP fetcher carries them through untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderOptions {
    /// Key into the user-agent catalog
    #[serde(default = "default_user_agent_key")]
    pub user_agent: String,

    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_true")]
    pub disable_images: bool,

    /// Seconds a rendering backend waits for dynamic content
    #[serde(default = "default_wait_time")]
    pub wait_time: f64,

    /// Page load deadline in seconds
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Extra settle wait before re-reading the page, set from the
    /// single-document override table; never part of the wire format
    #[serde(skip)]
    pub settle_wait: Option<f64>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent_key(),
            headless: true,
            disable_images: true,
            wait_time: default_wait_time(),
            page_load_timeout: default_page_load_timeout(),
            settle_wait: None,
        }
    }
}

impl From<&FetchDefaults> for RenderOptions {
    fn from(defaults: &FetchDefaults) -> Self {
        Self {
            user_agent: defaults.user_agent.clone(),
            headless: defaults.headless,
            disable_images: defaults.disable_images,
            wait_time: defaults.dynamic_content_wait,
            page_load_timeout: defaults.page_load_timeout,
            settle_wait: None,
        }
    }
}

/// A successfully fetched and parsed page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// URL after redirects
    pub final_url: Url,

    pub was_redirected: bool,

    /// Raw page markup
    pub html: String,

    pub title: Option<String>,

    pub description: Option<String>,

    /// Absolute link URLs in document order
    pub links: Vec<Url>,

    pub elements: ElementCounts,
}

/// Per-page fetch failure
///
/// These never abort a session; the orchestrator records them on the page
/// and moves on.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Timeout fetching {url}")]
    Timeout { url: String },

    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error("Render error for {url}: {message}")]
    Render { url: String, message: String },
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Timeout { .. } => FetchErrorKind::Timeout,
            FetchError::Network { .. } => FetchErrorKind::Network,
            FetchError::Render { .. } => FetchErrorKind::Render,
        }
    }
}

/// The fetch collaborator seam
///
/// Any resource a fetch acquires (a page handle, a browser tab) is scoped
/// to that one call and must be released on both success and failure
/// before returning; nothing outlives a single fetch.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Retrieves one page and extracts its links and metadata
    async fn fetch(&self, url: &Url, options: &RenderOptions) -> Result<FetchedPage, FetchError>;
}

/// Plain HTTP fetch collaborator backed by reqwest
///
/// Follows redirects (reporting the final URL), applies the per-fetch
/// user agent and timeout, and parses the body for links and metadata.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Builds the fetcher and its HTTP client
    ///
    /// Failure here is infrastructure-level: the session cannot dispatch
    /// any fetch at all.
    pub fn new() -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// One GET round trip: status, content-type, final URL, body
    async fn get_once(
        &self,
        url: &Url,
        options: &RenderOptions,
    ) -> Result<(Url, String), FetchError> {
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, resolve_user_agent(&options.user_agent))
            .timeout(Duration::from_secs(options.page_load_timeout))
            .send()
            .await
            .map_err(|e| classify_reqwest_error(url, e))?;

        let status = response.status();
        let final_url = response.url().clone();

        if !status.is_success() {
            return Err(FetchError::Network {
                url: url.to_string(),
                message: format!("HTTP {}", status.as_u16()),
            });
        }

        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        if !content_type.is_empty()
            && !content_type.contains("html")
            && !content_type.starts_with("text/")
        {
            return Err(FetchError::Render {
                url: url.to_string(),
                message: format!("Expected HTML, got {}", content_type),
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        })?;

        Ok((final_url, body))
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url, options: &RenderOptions) -> Result<FetchedPage, FetchError> {
        let (mut final_url, mut html) = self.get_once(url, options).await?;

        // Single-document destinations need time for their redirect chain
        // to settle; wait, then re-read wherever the first fetch landed
        if let Some(wait) = options.settle_wait {
            let wait = wait.max(0.0);
            tracing::debug!("Settle wait {:.2}s before re-reading {}", wait, final_url);
            tokio::time::sleep(Duration::from_secs_f64(wait)).await;

            let (settled_url, settled_html) = self.get_once(&final_url, options).await?;
            final_url = settled_url;
            html = settled_html;
        }

        let parsed = parse_page(&html, &final_url);

        Ok(FetchedPage {
            was_redirected: final_url != *url,
            final_url,
            html,
            title: parsed.title,
            description: parsed.description,
            links: parsed.links,
            elements: parsed.elements,
        })
    }
}

fn classify_reqwest_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Network {
            url: url.to_string(),
            message: "Connection failed".to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}
