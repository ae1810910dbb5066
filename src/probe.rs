//! The web cache deception and poisoning check.
//!
//! For every probe target a baseline is fetched, then each variant URL is
//! requested twice and the pair is classified by a `CacheStrategy`. A variant
//! whose replay looks cached is reported as a finding. Poisoning probes send a
//! canary in an unkeyed header and look for it in a header-less replay.

use crate::output::{Reporter, format_finding};
use crate::payloads::{KNOWN_PATHS, UNKEYED_HEADERS, WCD_PAYLOADS, WcdPayload};
use crate::session::{Snapshot, fetch};
use crate::strategy::{CacheStrategy, CacheVerdict, VerdictSource, body_similarity};
use rand::Rng;
use rand::distr::Alphanumeric;
use reqwest::Client;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use url::{Position, Url};

const BASELINE_SIMILARITY: f32 = 0.9;
const TOKEN_LEN: usize = 10;

/// Inputs of one WCD check.
#[derive(Debug, Clone, Default)]
pub struct ProbeConfig<'a> {
    /// Expected in a poisoned or cached body when set.
    pub keyword: Option<&'a str>,
    /// A path supplied with `--path`, probed in addition to `KNOWN_PATHS`.
    pub known_path: Option<&'a str>,
    /// Absolute URLs found reachable during recon.
    pub extra_urls: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingKind {
    Deception,
    Poisoning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordState {
    NotRequested,
    Present,
    Absent,
}

impl KeywordState {
    pub fn check(keyword: Option<&str>, body: &str) -> Self {
        match keyword {
            None => KeywordState::NotRequested,
            Some(k) if body.contains(k) => KeywordState::Present,
            Some(_) => KeywordState::Absent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

/// A variant whose replay appears to have been served from a cache.
#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub kind: FindingKind,
    pub target: String,
    pub variant: String,
    /// The payload or header that produced the variant.
    pub payload: String,
    pub status: u16,
    pub verdict_source: VerdictSource,
    pub indicators: Vec<String>,
    pub matches_baseline: bool,
    pub keyword: KeywordState,
    pub confidence: Confidence,
}

/// Base URL, known paths, `--path` and recon hits, deduplicated in
/// first-seen order.
pub fn probe_targets(base_url: &Url, known_path: Option<&str>, extra_urls: &[String]) -> Vec<Url> {
    let mut seen = HashSet::new();
    let mut targets = Vec::new();

    let mut candidates: Vec<&str> = KNOWN_PATHS.to_vec();
    candidates.extend(known_path);
    candidates.extend(extra_urls.iter().map(String::as_str));

    let joined = candidates.into_iter().filter_map(|p| base_url.join(p).ok());
    for mut url in std::iter::once(base_url.clone()).chain(joined) {
        url.set_fragment(None);
        if seen.insert(url.to_string()) {
            targets.push(url);
        }
    }

    targets
}

/// Builds the variant URL for `payload`, with `{token}` replaced by `token`.
///
/// Returns `None` when the payload needs a non-root path and the target has none.
pub fn build_variant(target: &Url, payload: WcdPayload, token: &str) -> Option<String> {
    let stem = target.path().trim_end_matches('/');
    let path = match payload {
        WcdPayload::Suffix(suffix) => {
            if stem.is_empty() && !suffix.starts_with('/') {
                return None;
            }
            format!("{stem}{}", suffix.replace("{token}", token))
        }
        WcdPayload::Prefix(prefix) => {
            let rest = stem.trim_start_matches('/');
            if rest.is_empty() {
                return None;
            }
            format!("{prefix}{rest}")
        }
    };

    let origin = &target[..Position::BeforePath];
    let query = target
        .query()
        .map(|q| format!("?{q}"))
        .unwrap_or_default();
    Some(format!("{origin}{path}{query}"))
}

/// Identifies one requested variant: the target it derives from, the URL
/// actually sent and the payload or header that produced it.
#[derive(Debug, Clone, Copy)]
pub struct VariantRef<'a> {
    pub kind: FindingKind,
    pub target: &'a str,
    pub variant: &'a str,
    pub payload: &'a str,
}

/// Decides whether a pair of variant responses is worth reporting.
///
/// The variant is flagged when the strategy says the replay was cached and the
/// replay is a 2xx. The keyword never suppresses a finding, it only raises
/// confidence when present.
pub fn assess(
    case: VariantRef<'_>,
    baseline: Option<&Snapshot>,
    first: &Snapshot,
    second: &Snapshot,
    keyword: Option<&str>,
    strategy: &dyn CacheStrategy,
) -> Option<Finding> {
    let classification = strategy.classify(first, second);
    if classification.verdict != CacheVerdict::Cached || !second.is_success() {
        return None;
    }

    let matches_baseline = baseline.is_some_and(|b| {
        b.status == first.status
            && (b.sha256 == first.sha256 || body_similarity(&b.body, &first.body) >= BASELINE_SIMILARITY)
    });
    let keyword_state = KeywordState::check(keyword, &second.body);

    let confidence = match classification.source {
        VerdictSource::BodyEquality => Confidence::Low,
        VerdictSource::Headers if matches_baseline || keyword_state == KeywordState::Present => {
            Confidence::High
        }
        VerdictSource::Headers => Confidence::Medium,
    };

    Some(Finding {
        kind: case.kind,
        target: case.target.to_string(),
        variant: case.variant.to_string(),
        payload: case.payload.to_string(),
        status: second.status,
        verdict_source: classification.source,
        indicators: classification.indicators,
        matches_baseline,
        keyword: keyword_state,
        confidence,
    })
}

/// Runs the WCD check against every probe target of `base_url`.
pub async fn wcd_check(
    client: &Client,
    base_url: &Url,
    config: &ProbeConfig<'_>,
    strategy: &dyn CacheStrategy,
    reporter: &Reporter,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for target in probe_targets(base_url, config.known_path, config.extra_urls) {
        let baseline = match fetch(client, target.as_str(), None).await {
            Ok(snapshot) if snapshot.is_success() => snapshot,
            Ok(snapshot) => {
                debug!(target = %target, status = snapshot.status, "skipping target");
                continue;
            }
            Err(e) => {
                debug!(target = %target, error = %e, "baseline request failed");
                continue;
            }
        };

        for finding in probe_deception(client, &target, &baseline, config, strategy).await {
            reporter.line(format_finding(&finding));
            findings.push(finding);
        }
        for finding in probe_poisoning(client, &target, config, strategy).await {
            reporter.line(format_finding(&finding));
            findings.push(finding);
        }
    }

    debug!(strategy = strategy.name(), findings = findings.len(), "wcd check done");
    findings
}

async fn probe_deception(
    client: &Client,
    target: &Url,
    baseline: &Snapshot,
    config: &ProbeConfig<'_>,
    strategy: &dyn CacheStrategy,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for payload in WCD_PAYLOADS {
        let Some(variant) = build_variant(target, *payload, &cache_buster()) else {
            continue;
        };

        let Some((first, second)) = request_twice(client, &variant, None).await else {
            continue;
        };

        let case = VariantRef {
            kind: FindingKind::Deception,
            target: target.as_str(),
            variant: &variant,
            payload: payload.label(),
        };
        if let Some(finding) = assess(
            case,
            Some(baseline),
            &first,
            &second,
            config.keyword,
            strategy,
        ) {
            findings.push(finding);
        }
    }

    findings
}

async fn probe_poisoning(
    client: &Client,
    target: &Url,
    config: &ProbeConfig<'_>,
    strategy: &dyn CacheStrategy,
) -> Vec<Finding> {
    let mut findings = Vec::new();

    for &header in UNKEYED_HEADERS {
        let token = cache_buster();
        let canary = format!("wcd{token}.example");

        let mut variant = target.clone();
        variant.query_pairs_mut().append_pair("wcd", &token);

        let Some((first, second)) =
            request_twice(client, variant.as_str(), Some((header, canary.as_str()))).await
        else {
            continue;
        };

        if !second.body.contains(&canary) {
            continue;
        }

        let case = VariantRef {
            kind: FindingKind::Poisoning,
            target: target.as_str(),
            variant: variant.as_str(),
            payload: header,
        };
        if let Some(finding) = assess(
            case,
            None,
            &first,
            &second,
            config.keyword,
            strategy,
        ) {
            findings.push(finding);
        }
    }

    findings
}

/// Sends the cache-populating request (with `first_header`, if any) and a
/// plain replay. Either failure drops the variant.
async fn request_twice(
    client: &Client,
    url: &str,
    first_header: Option<(&str, &str)>,
) -> Option<(Snapshot, Snapshot)> {
    let first = match fetch(client, url, first_header).await {
        Ok(snapshot) => snapshot,
        Err(e) => {
            debug!(url, error = %e, "first request failed");
            return None;
        }
    };
    match fetch(client, url, None).await {
        Ok(second) => Some((first, second)),
        Err(e) => {
            debug!(url, error = %e, "replay failed");
            None
        }
    }
}

fn cache_buster() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(TOKEN_LEN)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}
