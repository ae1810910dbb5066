//! Reconnaissance: discovers candidate sensitive paths on a target.
//!
//! Candidates come from robots.txt, links on the homepage and a fixed
//! bruteforce list. Every candidate is then requested once and the reachable
//! ones (2xx or 3xx after redirects) are reported.

use crate::output::{Reporter, format_accessible};
use crate::parser::same_origin;
use crate::payloads::DEFAULT_PATHS;
use crate::rules::SensitivityRules;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Serialize;
use tracing::debug;
use url::Url;

static LINK_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a[href], link[href]").unwrap());
static FORM_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("form[action]").unwrap());

const SKIPPED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:"];

/// A candidate path that answered with a 2xx or 3xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessiblePath {
    pub path: String,
    pub url: String,
    pub status: u16,
}

/// Fetches `/robots.txt` from the target's origin. Any failure yields `None`.
pub async fn fetch_robots_txt(client: &Client, base_url: &Url) -> Option<String> {
    let robots_url = base_url.join("/robots.txt").ok()?;
    fetch_text(client, &robots_url).await
}

/// Extracts sensitive-looking paths from `Disallow:` and `Allow:` lines.
///
/// Order follows the file and duplicates are kept.
pub fn search_sensitive_paths_in_robots(text: &str, rules: &SensitivityRules) -> Vec<String> {
    let mut paths = Vec::new();

    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("").trim();
        let Some((directive, value)) = line.split_once(':') else {
            continue;
        };

        let directive = directive.trim().to_ascii_lowercase();
        if directive != "disallow" && directive != "allow" {
            continue;
        }

        let value = value.trim();
        if matches!(value, "" | "/" | "*" | "/*") {
            continue;
        }

        if rules.is_sensitive(value) {
            paths.push(value.to_string());
        }
    }

    paths
}

/// Fetches the target page itself. Returns `None` on failure or non-2xx.
pub async fn fetch_html(client: &Client, base_url: &Url) -> Option<String> {
    fetch_text(client, base_url).await
}

/// Extracts same-origin links whose path looks sensitive, resolved to
/// absolute URLs against `base_url`.
pub fn search_sensitive_links_in_html(
    html: &str,
    base_url: &Url,
    rules: &SensitivityRules,
) -> Vec<String> {
    let document = Html::parse_document(html);

    let hrefs = document
        .select(&LINK_SELECTOR)
        .filter_map(|el| el.value().attr("href"));
    let actions = document
        .select(&FORM_SELECTOR)
        .filter_map(|el| el.value().attr("action"));

    let mut links = Vec::new();
    for reference in hrefs.chain(actions) {
        let reference = reference.trim();
        if reference.is_empty() || reference.starts_with('#') {
            continue;
        }
        let lower = reference.to_ascii_lowercase();
        if SKIPPED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
            continue;
        }

        let Ok(resolved) = base_url.join(reference) else {
            continue;
        };
        if !same_origin(&resolved, base_url) {
            continue;
        }

        let candidate = match resolved.query() {
            Some(query) => format!("{}?{}", resolved.path(), query),
            None => resolved.path().to_string(),
        };
        if rules.is_sensitive(&candidate) {
            links.push(resolved.to_string());
        }
    }

    links
}

/// Requests every path joined against `base_url` and reports the reachable
/// ones. A failing request marks that path inaccessible and the loop moves on.
pub async fn check_path_accessibility(
    client: &Client,
    base_url: &Url,
    paths: &[String],
    reporter: &Reporter,
) -> Vec<AccessiblePath> {
    let mut accessible = Vec::new();

    for path in paths {
        let url = match base_url.join(path) {
            Ok(url) => url,
            Err(e) => {
                debug!(path = %path, error = %e, "cannot join path");
                continue;
            }
        };

        match client.get(url.clone()).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                if (200..400).contains(&status) {
                    let found = AccessiblePath {
                        path: path.clone(),
                        url: url.to_string(),
                        status,
                    };
                    reporter.line(format_accessible(&found));
                    accessible.push(found);
                } else {
                    debug!(url = %url, status, "not accessible");
                }
            }
            Err(e) => debug!(url = %url, error = %e, "request failed"),
        }
    }

    accessible
}

/// Runs the accessibility check over `DEFAULT_PATHS`.
pub async fn bruteforce_common_paths(
    client: &Client,
    base_url: &Url,
    reporter: &Reporter,
) -> Vec<AccessiblePath> {
    let paths: Vec<String> = DEFAULT_PATHS.iter().map(|p| p.to_string()).collect();
    check_path_accessibility(client, base_url, &paths, reporter).await
}

/// Full recon pass: robots.txt, homepage links, then bruteforce.
pub async fn run(
    client: &Client,
    base_url: &Url,
    rules: &SensitivityRules,
    reporter: &Reporter,
) -> Vec<AccessiblePath> {
    let robots_paths = match fetch_robots_txt(client, base_url).await {
        Some(text) => search_sensitive_paths_in_robots(&text, rules),
        None => Vec::new(),
    };

    let html_links = match fetch_html(client, base_url).await {
        Some(html) => search_sensitive_links_in_html(&html, base_url, rules),
        None => Vec::new(),
    };
    debug!(
        robots = robots_paths.len(),
        links = html_links.len(),
        "recon candidates"
    );

    let mut accessible = check_path_accessibility(client, base_url, &robots_paths, reporter).await;
    accessible.extend(check_path_accessibility(client, base_url, &html_links, reporter).await);
    accessible.extend(bruteforce_common_paths(client, base_url, reporter).await);
    accessible
}

async fn fetch_text(client: &Client, url: &Url) -> Option<String> {
    match client.get(url.clone()).send().await {
        Ok(response) if response.status().is_success() => response.text().await.ok(),
        Ok(response) => {
            debug!(url = %url, status = response.status().as_u16(), "non-success response");
            None
        }
        Err(e) => {
            debug!(url = %url, error = %e, "request failed");
            None
        }
    }
}
