//! Strategies deciding whether a replayed response came from a cache.
//!
//! A probe requests the same variant URL twice. The first request may populate
//! a cache, the second may be answered by it. A `CacheStrategy` looks at the
//! pair and returns a `Classification`. Header evidence is preferred; when no
//! response carries cache headers the default strategy falls back to comparing
//! status and body, which also matches pages that are naturally stable.

use crate::session::Snapshot;
use serde::Serialize;

/// Headers that, when present on either response, mean a cache sits in front
/// of the origin and reports its decisions.
const CACHE_STATUS_HEADERS: &[&str] = &[
    "x-cache",
    "x-cache-status",
    "x-cache-hits",
    "x-proxy-cache",
    "x-drupal-cache",
    "x-varnish",
    "x-varnish-cache",
    "cf-cache-status",
    "akamai-cache-status",
    "cdn-cache",
    "age",
];

/// Headers whose value contains "hit" on a cache hit.
const HIT_SUBSTRING_HEADERS: &[&str] = &[
    "x-cache",
    "x-cache-status",
    "x-proxy-cache",
    "x-drupal-cache",
    "x-varnish-cache",
    "akamai-cache-status",
    "cdn-cache",
];

const CF_HIT_VALUES: &[&str] = &["HIT", "STALE", "UPDATING", "REVALIDATED"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheVerdict {
    Cached,
    NotCached,
    /// The two responses disagree on status, so no conclusion is drawn.
    Inconsistent,
}

/// Which evidence produced a verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictSource {
    Headers,
    BodyEquality,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub verdict: CacheVerdict,
    pub source: VerdictSource,
    /// Cache headers of the replay, formatted as `Name: value`.
    pub indicators: Vec<String>,
}

pub trait CacheStrategy {
    fn name(&self) -> &'static str;

    fn classify(&self, first: &Snapshot, second: &Snapshot) -> Classification;
}

/// Trusts only explicit hit indicators on the replayed response.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeaderStrategy;

impl CacheStrategy for HeaderStrategy {
    fn name(&self) -> &'static str {
        "headers"
    }

    fn classify(&self, first: &Snapshot, second: &Snapshot) -> Classification {
        let indicators = hit_indicators(second);
        let verdict = if first.status != second.status {
            CacheVerdict::Inconsistent
        } else if indicators.is_empty() {
            CacheVerdict::NotCached
        } else {
            CacheVerdict::Cached
        };

        Classification {
            verdict,
            source: VerdictSource::Headers,
            indicators,
        }
    }
}

/// Treats an identical status and body as a cache hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct BodyEqualityStrategy;

impl CacheStrategy for BodyEqualityStrategy {
    fn name(&self) -> &'static str {
        "body-equality"
    }

    fn classify(&self, first: &Snapshot, second: &Snapshot) -> Classification {
        let verdict = if first.status != second.status {
            CacheVerdict::Inconsistent
        } else if first.sha256 == second.sha256 {
            CacheVerdict::Cached
        } else {
            CacheVerdict::NotCached
        };

        Classification {
            verdict,
            source: VerdictSource::BodyEquality,
            indicators: Vec::new(),
        }
    }
}

/// Header strategy when any cache header is present, body equality otherwise.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultStrategy;

impl CacheStrategy for DefaultStrategy {
    fn name(&self) -> &'static str {
        "default"
    }

    fn classify(&self, first: &Snapshot, second: &Snapshot) -> Classification {
        if has_cache_headers(first) || has_cache_headers(second) {
            HeaderStrategy.classify(first, second)
        } else {
            BodyEqualityStrategy.classify(first, second)
        }
    }
}

pub fn has_cache_headers(snapshot: &Snapshot) -> bool {
    CACHE_STATUS_HEADERS
        .iter()
        .any(|name| snapshot.headers.contains_key(*name))
}

/// Lists the headers of `snapshot` that report a cache hit.
pub fn hit_indicators(snapshot: &Snapshot) -> Vec<String> {
    let mut indicators = Vec::new();

    for name in HIT_SUBSTRING_HEADERS {
        if let Some(value) = snapshot.header(name) {
            if value.to_ascii_lowercase().contains("hit") {
                indicators.push(format!("{name}: {value}"));
            }
        }
    }

    if let Some(value) = snapshot.header("cf-cache-status") {
        if CF_HIT_VALUES.contains(&value.trim().to_ascii_uppercase().as_str()) {
            indicators.push(format!("cf-cache-status: {value}"));
        }
    }

    if let Some(value) = snapshot.header("age") {
        if value.trim().parse::<u64>().is_ok_and(|age| age > 0) {
            indicators.push(format!("age: {value}"));
        }
    }

    // Varnish appends the id of the request that filled the cache.
    if let Some(value) = snapshot.header("x-varnish") {
        if value.split_whitespace().count() >= 2 {
            indicators.push(format!("x-varnish: {value}"));
        }
    }

    if let Some(value) = snapshot.header("x-cache-hits") {
        if value
            .split(',')
            .any(|n| n.trim().parse::<u64>().is_ok_and(|n| n > 0))
        {
            indicators.push(format!("x-cache-hits: {value}"));
        }
    }

    indicators
}

/// Rough similarity of two bodies in `0.0..=1.0`, based on length ratio and
/// matching leading and trailing bytes.
pub fn body_similarity(a: &str, b: &str) -> f32 {
    if a.is_empty() || b.is_empty() {
        return if a == b { 1.0 } else { 0.0 };
    }
    if a == b {
        return 1.0;
    }

    let (a, b) = (a.as_bytes(), b.as_bytes());
    let len_a = a.len() as f32;
    let len_b = b.len() as f32;

    let length_ratio = len_a.min(len_b) / len_a.max(len_b);
    if length_ratio < 0.7 {
        return 0.0;
    }

    let head = 1000.min(a.len()).min(b.len());
    let tail = 500.min(a.len()).min(b.len());
    let head_match = a[..head] == b[..head];
    let tail_match = a[a.len() - tail..] == b[b.len() - tail..];

    let mut score = length_ratio * 0.4;
    if head_match {
        score += 0.4;
    }
    if tail_match {
        score += 0.2;
    }
    score
}
