//! This module handles all output-related functionality.
//! It formats recon hits and findings for the console, keeps printed lines
//! clear of the file-mode progress bar, and renders the final summary either
//! as a coloured table or as JSON.

use crate::probe::{Confidence, Finding, FindingKind, KeywordState};
use crate::recon::AccessiblePath;
use crate::scanner::ScanSummary;
use crate::strategy::VerdictSource;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Mutex;

enum Sink {
    Stdout,
    Buffer(Mutex<Vec<String>>),
}

/// Routes console lines around an optional progress bar.
///
/// In quiet mode (JSON output) result lines are dropped so stdout only carries
/// the final document; errors then go to stderr.
pub struct Reporter {
    progress: Option<ProgressBar>,
    quiet: bool,
    sink: Sink,
}

impl Reporter {
    pub fn new(quiet: bool) -> Self {
        Self {
            progress: None,
            quiet,
            sink: Sink::Stdout,
        }
    }

    /// A reporter that keeps every line in memory instead of printing it.
    pub fn buffered() -> Self {
        Self {
            progress: None,
            quiet: false,
            sink: Sink::Buffer(Mutex::new(Vec::new())),
        }
    }

    /// Lines written so far by a buffered reporter.
    pub fn captured(&self) -> Vec<String> {
        match &self.sink {
            Sink::Buffer(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
            Sink::Stdout => Vec::new(),
        }
    }

    /// A reporter showing a progress line over `len` targets.
    pub fn with_progress(len: u64, quiet: bool) -> Self {
        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{pos}/{len}] {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
        );
        Self {
            progress: Some(pb),
            quiet,
            sink: Sink::Stdout,
        }
    }

    pub fn line(&self, text: String) {
        if self.quiet {
            return;
        }
        match (&self.sink, &self.progress) {
            (Sink::Buffer(lines), _) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(text);
                }
            }
            (Sink::Stdout, Some(pb)) => pb.suspend(|| println!("{text}")),
            (Sink::Stdout, None) => println!("{text}"),
        }
    }

    pub fn section(&self, title: &str) {
        self.line(format!("== {title} =="));
    }

    pub fn error(&self, error: &dyn std::fmt::Display) {
        let text = format!("{} : {error}", "Error".red().bold());
        if self.quiet {
            eprintln!("{text}");
        } else {
            self.line(text);
        }
    }

    /// Shows `url` as the target currently being scanned.
    pub fn set_current(&self, url: &str) {
        if let Some(pb) = &self.progress {
            pb.set_message(url.to_string());
        }
    }

    pub fn advance(&self) {
        if let Some(pb) = &self.progress {
            pb.inc(1);
        }
    }

    pub fn finish(&self) {
        if let Some(pb) = &self.progress {
            pb.finish_and_clear();
        }
    }
}

/// Formats a reachable recon path.
pub fn format_accessible(found: &AccessiblePath) -> String {
    let status = if found.status < 300 {
        found.status.to_string().green()
    } else {
        found.status.to_string().yellow()
    };
    format!("{} {} [{status}]", "[+]".green().bold(), found.path)
}

/// Formats a finding as a single console line.
pub fn format_finding(finding: &Finding) -> String {
    let tag = match finding.kind {
        FindingKind::Deception => "[WCD]".red().bold(),
        FindingKind::Poisoning => "[POISON]".magenta().bold(),
    };

    let confidence = match finding.confidence {
        Confidence::High => "high".red().bold(),
        Confidence::Medium => "medium".yellow(),
        Confidence::Low => "low".dimmed(),
    };

    let evidence = match finding.verdict_source {
        VerdictSource::Headers => finding.indicators.join(", "),
        VerdictSource::BodyEquality => "identical replay, no cache headers".to_string(),
    };

    let mut output = format!(
        "{tag} {variant} [{status}] ({evidence}) confidence: {confidence}",
        variant = finding.variant,
        status = finding.status.to_string().green(),
        evidence = evidence.cyan(),
    );

    if finding.matches_baseline {
        output.push_str(&format!(" {}", "[matches baseline]".yellow()));
    }

    match finding.keyword {
        KeywordState::Present => output.push_str(&format!(" {}", "keyword: present".green().bold())),
        KeywordState::Absent => output.push_str(&format!(" {}", "keyword: absent".dimmed())),
        KeywordState::NotRequested => {}
    }

    output
}

/// Prints the end-of-run summary table.
pub fn print_summary(summary: &ScanSummary) {
    println!("\n{}", "Summary:".bold().underline().blue());
    println!(
        "{:<15}{}",
        "URLs:".bold(),
        summary.reports.len().to_string().white()
    );
    println!(
        "{:<15}{}",
        "Accessible:".bold(),
        summary.accessible_count().to_string().green()
    );
    println!(
        "{:<15}{}",
        "Findings:".bold(),
        summary.finding_count().to_string().red()
    );
    println!(
        "{:<15}{}",
        "Errors:".bold(),
        summary.error_count().to_string().yellow()
    );
    println!(
        "{:<15}{:.2}s",
        "Elapsed:".bold(),
        summary.duration_secs()
    );

    let failed: Vec<_> = summary
        .reports
        .iter()
        .filter_map(|r| r.error.as_ref().map(|e| (&r.url, e)))
        .collect();
    if !failed.is_empty() {
        println!("\n{}", "Failed targets:".bold().yellow());
        for (url, error) in failed {
            println!("  {} {}", url.red(), error.dimmed());
        }
    }
}

/// Serializes the summary as pretty JSON.
pub fn summary_json(summary: &ScanSummary) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(summary)
}
