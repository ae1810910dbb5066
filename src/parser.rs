//! This module contains the parsing helpers used by the driver.
//! It handles URL list files, custom headers and target URLs.

use crate::error::{ScanError, ScanResult};
use std::collections::HashMap;
use std::fs::read_to_string;
use url::Url;

/// Parses a URL list file into a vector of strings.
///
/// Each line is trimmed; empty lines are ignored and order is preserved.
/// Lines are not validated here, a malformed entry fails when it is scanned.
pub fn parse_url_file(path: &str) -> ScanResult<Vec<String>> {
    let content = read_to_string(path).map_err(|source| ScanError::Io {
        path: path.to_string(),
        source,
    })?;
    let urls: Vec<String> = content
        .lines()
        .map(|line| line.trim().to_string())
        .filter(|line| !line.is_empty())
        .collect();
    Ok(urls)
}

/// Parses a vector of custom header strings into a HashMap.
///
/// Each string is expected to be in "key: value" format. Entries without a
/// colon are skipped and a later duplicate key overwrites an earlier one.
pub fn parse_custom_headers(headers: &[String]) -> HashMap<String, String> {
    let mut header_map = HashMap::new();
    for header in headers {
        if let Some((key, value)) = header.split_once(':') {
            header_map.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    header_map
}

/// Parses a target into an absolute http(s) URL.
pub fn parse_target(raw: &str) -> ScanResult<Url> {
    let url = Url::parse(raw).map_err(|source| ScanError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ScanError::UnsupportedScheme(other.to_string())),
    }
}

/// Returns true when both URLs share scheme, host and port.
pub fn same_origin(a: &Url, b: &Url) -> bool {
    a.scheme() == b.scheme()
        && a.host_str() == b.host_str()
        && a.port_or_known_default() == b.port_or_known_default()
}
