//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with the crawler's user agent string
//! - Following redirects manually so every hop is recorded
//! - Bounding each request with a timeout
//! - Parsing HTML bodies into anchors
//! - Error classification

use crate::config::{Config, UserAgentConfig};
use crate::crawler::parser::{parse_html, AnchorTag};
use reqwest::header::{CONTENT_TYPE, LOCATION};
use reqwest::{redirect::Policy, Client};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// How much of a response the caller needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Read and parse the body for anchors
    Expand,
    /// Status code and redirect chain only; the body is never read
    StatusOnly,
}

/// A fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub final_url: Url,

    /// HTTP status code of the final response
    pub status_code: u16,

    /// Every redirect target, in the order it was followed
    pub redirect_chain: Vec<String>,

    /// Content-Type header value
    pub content_type: Option<String>,

    /// Page title (only for expanded HTML pages)
    pub title: Option<String>,

    /// Anchors found on the page (only for expanded HTML pages)
    pub anchors: Vec<AnchorTag>,
}

/// Per-page fetch failures. These are recorded, never propagated.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Redirect loop detected at {url}")]
    RedirectLoop { url: String },

    #[error("Invalid redirect from {url} to {location}")]
    InvalidRedirect { url: String, location: String },

    #[error("Failed to parse body of {url}: {message}")]
    Parse { url: String, message: String },
}

impl FetchError {
    /// Short machine-readable name of the failure
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Connect { .. } => "connect",
            Self::Http { .. } => "http",
            Self::RedirectLimit { .. } => "redirect_limit",
            Self::RedirectLoop { .. } => "redirect_loop",
            Self::InvalidRedirect { .. } => "invalid_redirect",
            Self::Parse { .. } => "parse",
        }
    }
}

/// The network boundary of the crawler
///
/// Implementations must bound every request with a timeout, record redirect
/// hops, and identify themselves with a user agent.
pub trait PageFetcher: Send + Sync + 'static {
    fn fetch(
        &self,
        url: &Url,
        mode: FetchMode,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send;
}

/// Builds an HTTP client with proper configuration
///
/// Redirects are disabled on the client; [`HttpFetcher`] follows them itself.
///
/// # Example
///
/// ```no_run
/// use sitewalk::config::UserAgentConfig;
/// use sitewalk::crawler::build_http_client;
/// use std::time::Duration;
///
/// let client = build_http_client(&UserAgentConfig::default(), Duration::from_secs(10)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.header_value())
        .timeout(timeout)
        .connect_timeout(timeout.min(Duration::from_secs(10)))
        .redirect(Policy::none()) // Handle redirects manually
        .gzip(true)
        .brotli(true)
        .build()
}

/// reqwest-backed [`PageFetcher`]
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    max_redirects: u32,
}

impl HttpFetcher {
    pub fn new(client: Client, max_redirects: u32) -> Self {
        Self {
            client,
            max_redirects,
        }
    }

    /// Builds the fetcher from the crawler and user agent sections
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&config.user_agent, config.crawler.request_timeout())?;
        Ok(Self::new(client, config.crawler.max_redirects))
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(
        &self,
        url: &Url,
        mode: FetchMode,
    ) -> impl Future<Output = Result<FetchedPage, FetchError>> + Send {
        fetch_url(&self.client, url, mode, self.max_redirects)
    }
}

/// Fetches a URL, following redirects manually
///
/// # Request Flow
///
/// 1. Send GET request
/// 2. On a 3xx with a `Location` header, resolve it against the current URL,
///    record it in the chain and repeat
///    - A hop back to any URL already in the chain is a loop
///    - More than `max_redirects` hops fails
/// 3. For `StatusOnly`, non-2xx, or non-HTML responses stop without reading
///    the body
/// 4. Otherwise read the body and extract anchors
///
/// No retries: a failed request is reported once.
pub async fn fetch_url(
    client: &Client,
    url: &Url,
    mode: FetchMode,
    max_redirects: u32,
) -> Result<FetchedPage, FetchError> {
    let mut current = url.clone();
    let mut redirect_chain: Vec<String> = Vec::new();

    let response = loop {
        let response = client
            .get(current.clone())
            .send()
            .await
            .map_err(|e| classify_error(&current, e))?;

        if !response.status().is_redirection() {
            break response;
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let Some(location) = location else {
            // 3xx without Location (e.g. 304) is a final answer
            break response;
        };

        let next = current
            .join(&location)
            .map_err(|_| FetchError::InvalidRedirect {
                url: current.to_string(),
                location: location.to_string(),
            })?;

        if next == *url || redirect_chain.iter().any(|hop| hop == next.as_str()) {
            return Err(FetchError::RedirectLoop {
                url: next.to_string(),
            });
        }

        if redirect_chain.len() >= max_redirects as usize {
            return Err(FetchError::RedirectLimit {
                url: url.to_string(),
            });
        }

        tracing::trace!("Redirect {} -> {}", current, next);
        redirect_chain.push(next.to_string());
        current = next;
    };

    let status = response.status();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let mut page = FetchedPage {
        final_url: current.clone(),
        status_code: status.as_u16(),
        redirect_chain,
        content_type,
        title: None,
        anchors: Vec::new(),
    };

    if mode == FetchMode::StatusOnly
        || !status.is_success()
        || !is_html(page.content_type.as_deref())
    {
        return Ok(page);
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: current.to_string(),
            }
        } else {
            FetchError::Parse {
                url: current.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    let parsed = parse_html(&body, current.as_str());
    page.title = parsed.title;
    page.anchors = parsed.anchors;

    Ok(page)
}

/// Returns true if the Content-Type allows anchor extraction
///
/// A missing header is given the benefit of the doubt.
pub fn is_html(content_type: Option<&str>) -> bool {
    match content_type {
        None => true,
        Some(ct) => {
            let ct = ct.to_ascii_lowercase();
            ct.contains("text/html") || ct.contains("application/xhtml+xml")
        }
    }
}

fn classify_error(url: &Url, error: reqwest::Error) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if error.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: error.to_string(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
