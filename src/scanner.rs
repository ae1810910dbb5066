//! Per-target orchestration: recon followed by the WCD check.
//!
//! Every target produces a `UrlReport`. A failure that stops a target is kept
//! in its report as a message instead of aborting the run.

use crate::error::ScanResult;
use crate::output::Reporter;
use crate::parser::parse_target;
use crate::probe::{Finding, ProbeConfig, wcd_check};
use crate::recon::{self, AccessiblePath};
use crate::rules::SensitivityRules;
use crate::strategy::CacheStrategy;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::debug;

/// Everything a target scan needs, built once per run.
pub struct ScanContext {
    pub client: Client,
    pub rules: SensitivityRules,
    pub strategy: Box<dyn CacheStrategy>,
    pub keyword: Option<String>,
    /// When set, recon is skipped and this path is probed as well.
    pub known_path: Option<String>,
    /// Print `== Recon ==` / `== WCD Check ==` headers.
    pub show_sections: bool,
    pub reporter: Reporter,
}

#[derive(Debug, Clone, Serialize)]
pub struct UrlReport {
    pub url: String,
    pub accessible: Vec<AccessiblePath>,
    pub findings: Vec<Finding>,
    pub error: Option<String>,
}

impl UrlReport {
    fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            accessible: Vec::new(),
            findings: Vec::new(),
            error: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanSummary {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub reports: Vec<UrlReport>,
}

impl ScanSummary {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            finished_at: started_at,
            reports: Vec::new(),
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    pub fn accessible_count(&self) -> usize {
        self.reports.iter().map(|r| r.accessible.len()).sum()
    }

    pub fn finding_count(&self) -> usize {
        self.reports.iter().map(|r| r.findings.len()).sum()
    }

    pub fn error_count(&self) -> usize {
        self.reports.iter().filter(|r| r.error.is_some()).count()
    }

    pub fn duration_secs(&self) -> f64 {
        (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
    }
}

/// Scans one target. Errors are printed as `Error : ...` and recorded.
pub async fn scan_url(ctx: &ScanContext, raw_url: &str) -> UrlReport {
    let mut report = UrlReport::new(raw_url);

    if let Err(e) = run_target(ctx, raw_url, &mut report).await {
        debug!(url = raw_url, error = ?e, "target aborted");
        ctx.reporter.error(&e);
        report.error = Some(e.to_string());
    }

    report
}

async fn run_target(ctx: &ScanContext, raw_url: &str, report: &mut UrlReport) -> ScanResult<()> {
    let base_url = parse_target(raw_url)?;

    if ctx.known_path.is_none() {
        if ctx.show_sections {
            ctx.reporter.section("Recon");
        }
        report.accessible = recon::run(&ctx.client, &base_url, &ctx.rules, &ctx.reporter).await;
    }

    if ctx.show_sections {
        ctx.reporter.section("WCD Check");
    }

    let extra_urls: Vec<String> = report.accessible.iter().map(|a| a.url.clone()).collect();
    let config = ProbeConfig {
        keyword: ctx.keyword.as_deref(),
        known_path: ctx.known_path.as_deref(),
        extra_urls: &extra_urls,
    };
    report.findings = wcd_check(
        &ctx.client,
        &base_url,
        &config,
        ctx.strategy.as_ref(),
        &ctx.reporter,
    )
    .await;

    Ok(())
}
