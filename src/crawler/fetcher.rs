//! Document fetching
//!
//! This module owns all document acquisition, including:
//! - The [`Fetch`] seam the traversal engine talks to
//! - Static fetches with a single HTTP GET
//! - Dispatch between static and rendered fetches
//! - Cookie string parsing for both strategies
//!
//! Each fetch is independent: nothing is cached between calls.

use crate::config::HttpConfig;
use crate::crawler::render::RenderedFetcher;
use crate::url::extract_domain;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Document acquisition strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Plain HTTP GET
    #[default]
    Static,
    /// Full browser rendering through WebDriver
    Rendered,
}

impl FetchMode {
    pub fn from_rendered(rendered: bool) -> Self {
        if rendered {
            Self::Rendered
        } else {
            Self::Static
        }
    }
}

/// Everything needed to acquire one document
#[derive(Debug, Clone, Copy)]
pub struct FetchRequest<'a> {
    pub url: &'a Url,
    /// Raw `name=value; name=value` cookie string
    pub cookie: Option<&'a str>,
    pub user_agent: &'a str,
    pub mode: FetchMode,
    /// Rendered mode: wait for this selector before capturing
    pub wait_selector: Option<&'a str>,
    /// Rendered mode: click this selector before capturing
    pub click_selector: Option<&'a str>,
}

impl<'a> FetchRequest<'a> {
    /// A static GET with no cookie
    pub fn get(url: &'a Url, user_agent: &'a str) -> Self {
        Self {
            url,
            cookie: None,
            user_agent,
            mode: FetchMode::Static,
            wait_selector: None,
            click_selector: None,
        }
    }
}

/// Capability to turn a URL into document source
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetches the document and returns its HTML source
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError>;
}

/// A cookie scoped to a host, as handed to the browser backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserCookie {
    pub name: String,
    pub value: String,
    pub domain: String,
}

/// Splits a cookie string into `(name, value)` pairs
///
/// Entries are separated by `;` and trimmed; blank entries and entries without
/// a name are dropped.
pub fn parse_cookies(raw: &str) -> Vec<(String, String)> {
    raw.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter_map(|entry| {
            let (name, value) = entry.split_once('=').unwrap_or((entry, ""));
            let name = name.trim();
            if name.is_empty() {
                return None;
            }
            Some((name.to_string(), value.trim().to_string()))
        })
        .collect()
}

/// Parses a cookie string into cookies scoped to the host of `url`
pub fn browser_cookies(raw: &str, url: &Url) -> Vec<BrowserCookie> {
    let Some(domain) = extract_domain(url) else {
        return Vec::new();
    };

    parse_cookies(raw)
        .into_iter()
        .map(|(name, value)| BrowserCookie {
            name,
            value,
            domain: domain.clone(),
        })
        .collect()
}

/// Normalized `Cookie` header value, `None` when the string holds no cookies
pub fn cookie_header(raw: &str) -> Option<String> {
    let pairs = parse_cookies(raw);
    if pairs.is_empty() {
        return None;
    }

    Some(
        pairs
            .iter()
            .map(|(name, value)| format!("{}={}", name, value))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

/// Builds the HTTP client used for static fetches
///
/// The user agent is set per request, since each crawl request may name its own.
pub fn build_http_client(config: &HttpConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Static fetch strategy: one GET per document
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Issues a GET with the request's headers and returns the body
    ///
    /// | Condition | Result |
    /// |-----------|--------|
    /// | 2xx | body text |
    /// | any other status | `FetchError::Status` |
    /// | timeout | `FetchError::Timeout` |
    /// | connection or body error | `FetchError::Http` |
    pub async fn get(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        let url = request.url.as_str();
        tracing::debug!("GET {}", url);

        let mut builder = self
            .client
            .get(request.url.clone())
            .header(USER_AGENT, request.user_agent);

        if let Some(cookie) = request.cookie.and_then(cookie_header) {
            builder = builder.header(COOKIE, cookie);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| classify_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| classify_error(url, e))
    }
}

fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        self.get(request).await
    }
}

/// Picks the static or rendered strategy per request
pub struct DocumentFetcher {
    http: HttpFetcher,
    renderer: Option<RenderedFetcher>,
}

impl DocumentFetcher {
    /// A fetcher that can only perform static fetches
    pub fn new(http: HttpFetcher) -> Self {
        Self {
            http,
            renderer: None,
        }
    }

    pub fn with_renderer(mut self, renderer: RenderedFetcher) -> Self {
        self.renderer = Some(renderer);
        self
    }
}

#[async_trait]
impl Fetch for DocumentFetcher {
    async fn fetch(&self, request: &FetchRequest<'_>) -> Result<String, FetchError> {
        match request.mode {
            FetchMode::Static => self.http.get(request).await,
            FetchMode::Rendered => match &self.renderer {
                Some(renderer) => renderer.render(request).await,
                None => Err(FetchError::RenderingUnavailable {
                    url: request.url.to_string(),
                }),
            },
        }
    }
}
