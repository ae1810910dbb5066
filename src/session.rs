//! The shared HTTP session and the response snapshots taken from it.
//!
//! A single `reqwest::Client` is built at startup and reused for every
//! request of the process. Custom headers and the user agent are installed as
//! default headers, certificate verification is disabled and cookies persist
//! between requests.

use crate::error::{ScanError, ScanResult};
use reqwest::Client;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, USER_AGENT};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

/// Session options shared by every target of a run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub user_agent: String,
    pub custom_headers: HashMap<String, String>,
    pub timeout: u64,
    pub proxy: Option<String>,
}

/// Builds the HTTP client used for the whole run.
pub fn build_client(config: &ScanConfig) -> ScanResult<Client> {
    let mut default_headers = HeaderMap::new();
    default_headers.insert(
        USER_AGENT,
        HeaderValue::from_str(&config.user_agent)
            .map_err(|_| ScanError::InvalidHeader(config.user_agent.clone()))?,
    );

    // Inserted after the user agent so `-H "User-Agent: ..."` wins.
    for (key, value) in &config.custom_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ScanError::InvalidHeader(format!("{key}: {value}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| ScanError::InvalidHeader(format!("{key}: {value}")))?;
        default_headers.insert(name, value);
    }

    let mut client_builder = Client::builder()
        .default_headers(default_headers)
        .danger_accept_invalid_certs(true)
        .cookie_store(true)
        .timeout(Duration::from_secs(config.timeout))
        .connect_timeout(Duration::from_secs(config.timeout.min(10)));

    if let Some(proxy_url) = &config.proxy {
        client_builder = client_builder.proxy(reqwest::Proxy::all(proxy_url)?);
    }

    Ok(client_builder.build()?)
}

/// Status, headers and body of one response, kept for comparison.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub status: u16,
    /// Header names are lowercase. Repeated headers are joined with ", ".
    pub headers: HashMap<String, String>,
    pub body: String,
    pub sha256: String,
}

impl Snapshot {
    pub fn from_parts(status: u16, headers: HashMap<String, String>, body: String) -> Self {
        let sha256 = sha256_hex(&body);
        Self {
            status,
            headers,
            body,
            sha256,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|v| v.as_str())
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Issues a GET and captures the response. `extra_header` is sent with this
/// request only, on top of the session's default headers.
pub async fn fetch(
    client: &Client,
    url: &str,
    extra_header: Option<(&str, &str)>,
) -> Result<Snapshot, reqwest::Error> {
    let mut request = client.get(url);
    if let Some((name, value)) = extra_header {
        request = request.header(name, value);
    }

    let response = request.send().await?;
    let status = response.status().as_u16();
    let headers = collect_headers(response.headers());
    // A truncated or unreadable body fails the whole fetch.
    let body = response.text().await?;

    debug!(url, status, bytes = body.len(), "fetched");
    Ok(Snapshot::from_parts(status, headers, body))
}

/// Flattens a header map. Values that are not valid UTF-8 are decoded lossily.
pub fn collect_headers(map: &HeaderMap) -> HashMap<String, String> {
    let mut headers: HashMap<String, String> = HashMap::new();
    for (name, value) in map {
        let value = String::from_utf8_lossy(value.as_bytes());
        headers
            .entry(name.as_str().to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.into_owned());
    }
    headers
}

/// Computes the SHA256 hash of a string and returns it as a hex string.
fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
