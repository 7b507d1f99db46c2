//! SciVal CSV export client.
//!
//! Issues one authenticated GET per (topic, endpoint, page), checks that the
//! platform answered with a file attachment rather than an HTML page, and
//! decodes the body to text.

use crate::endpoint::EndpointKind;
use crate::error::{Result, ScivalError};
use reqwest::header::{HeaderMap, CONTENT_DISPOSITION, COOKIE};
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Default SciVal URL
pub const DEFAULT_BASE_URL: &str = "https://www.scival.com";

/// User agent string for requests
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Request timeout in seconds
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// UTF-8 byte order mark emitted in front of SciVal exports
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Connection options for the export client
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Custom base URL (mirror or test server)
    pub base_url: Option<String>,
    /// Proxy URL (e.g., "http://127.0.0.1:7890")
    pub proxy: Option<String>,
    /// User-Agent header value
    pub user_agent: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: None,
            proxy: None,
            user_agent: USER_AGENT.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

/// Authenticated client for the SciVal export endpoints.
///
/// The session cookie is supplied by the caller and sent verbatim; it is never
/// refreshed or validated here.
#[derive(Debug, Clone)]
pub struct ScivalClient {
    client: reqwest::Client,
    base_url: String,
    cookie: String,
}

impl ScivalClient {
    /// Create a client for the public SciVal site
    pub fn new(cookie: impl Into<String>) -> Result<Self> {
        Self::with_options(cookie, &ClientOptions::default())
    }

    /// Create a client with custom connection options
    pub fn with_options(cookie: impl Into<String>, options: &ClientOptions) -> Result<Self> {
        let base_url = options
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_BASE_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client: build_http_client(options)?,
            base_url,
            cookie: cookie.into(),
        })
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the export URL for one page of a topic
    pub fn export_url(&self, topic_id: &str, kind: EndpointKind, page: u32) -> Result<Url> {
        build_export_url(&self.base_url, topic_id, kind, page)
    }

    /// Fetch one page of a topic export as text.
    ///
    /// # Errors
    ///
    /// - [`ScivalError::Network`] on connection errors, timeouts and non-2xx statuses
    /// - [`ScivalError::UnexpectedResponse`] when the body is not served as an attachment
    /// - [`ScivalError::Decode`] when the body is not UTF-8
    pub async fn fetch(&self, topic_id: &str, kind: EndpointKind, page: u32) -> Result<String> {
        let url = self.export_url(topic_id, kind, page)?;
        debug!(endpoint = %kind, topic = topic_id, page = page, url = %url, "Fetching export page");

        let response = self
            .client
            .get(url)
            .header(COOKIE, self.cookie.as_str())
            .send()
            .await?
            .error_for_status()?;

        let status = response.status().as_u16();
        let content_disposition = content_disposition(response.headers());

        if !is_attachment(content_disposition.as_deref()) {
            return Err(ScivalError::UnexpectedResponse {
                status,
                content_disposition,
            });
        }

        let bytes = response.bytes().await?;
        debug!(endpoint = %kind, topic = topic_id, page = page, bytes = bytes.len(), "Received export page");

        decode_export_body(&bytes)
    }
}

/// Build HTTP client with optional proxy
fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(options.user_agent.as_str())
        .timeout(options.timeout);

    if let Some(proxy_url) = options.proxy.as_deref() {
        let proxy = reqwest::Proxy::all(proxy_url).map_err(|e| {
            ScivalError::Config(format!("Invalid proxy URL '{}': {}", proxy_url, e))
        })?;
        builder = builder.proxy(proxy);
    }

    builder
        .build()
        .map_err(|e| ScivalError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Build SciVal export URL
fn build_export_url(base_url: &str, topic_id: &str, kind: EndpointKind, page: u32) -> Result<Url> {
    let mut url = Url::parse(&format!("{}{}", base_url, kind.path()))
        .map_err(|e| ScivalError::Config(format!("Invalid base URL: {}", e)))?;

    url.query_pairs_mut()
        .append_pair("uri", &format!("Topic/{}", topic_id))
        .append_pair("exportFileType", "csv")
        .append_pair("currentPage", &page.to_string());

    Ok(url)
}

/// Content-Disposition of a response; non-ASCII filenames are decoded lossily
fn content_disposition(headers: &HeaderMap) -> Option<String> {
    headers
        .get(CONTENT_DISPOSITION)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned())
}

/// Whether a Content-Disposition value announces a downloadable file
fn is_attachment(content_disposition: Option<&str>) -> bool {
    content_disposition
        .map(|v| v.to_ascii_lowercase().contains("attachment"))
        .unwrap_or(false)
}

/// Decode an export body as UTF-8, dropping a leading byte order mark
pub fn decode_export_body(bytes: &[u8]) -> Result<String> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    String::from_utf8(bytes.to_vec()).map_err(|e| ScivalError::Decode(e.to_string()))
}
