//! This is the main entry point for the wcdetect application.
//! It handles the entire scanning process, including:
//! - Parsing command-line arguments.
//! - Building the shared HTTP session.
//! - Running recon and the WCD check for one URL or every URL of a file.
//! - Handling Ctrl+C.
//! - Displaying the final summary.

use chrono::Utc;
use clap::{CommandFactory, Parser};
use std::process::ExitCode;
use tokio::signal;
use tracing_subscriber::EnvFilter;
use wcdetect::output::{self, Reporter};
use wcdetect::parser;
use wcdetect::rules::SensitivityRules;
use wcdetect::scanner::{ScanContext, ScanSummary, scan_url};
use wcdetect::session::{ScanConfig, build_client};
use wcdetect::strategy::DefaultStrategy;

mod args;

#[tokio::main]
async fn main() -> ExitCode {
    if std::env::args_os().len() == 1 {
        eprintln!("{}", args::Args::command().render_help());
        return ExitCode::from(1);
    }

    let args = args::Args::parse();
    init_tracing(args.verbose);

    let config = ScanConfig {
        user_agent: args.user_agent.clone(),
        custom_headers: parser::parse_custom_headers(&args.headers),
        timeout: args.timeout,
        proxy: args.proxy.clone(),
    };

    let client = match build_client(&config) {
        Ok(client) => client,
        Err(e) => {
            eprintln!("Error : {e}");
            return ExitCode::from(1);
        }
    };

    // File mode when --file is given, single-URL mode otherwise.
    let (targets, reporter) = match (&args.file, &args.url) {
        (Some(file), _) => match parser::parse_url_file(file) {
            Ok(urls) => {
                let reporter = Reporter::with_progress(urls.len() as u64, args.json);
                (urls, reporter)
            }
            Err(e) => {
                eprintln!("Error : {e}");
                return ExitCode::from(1);
            }
        },
        (None, Some(url)) => (vec![url.clone()], Reporter::new(args.json)),
        (None, None) => {
            eprintln!("{}", args::Args::command().render_help());
            return ExitCode::from(1);
        }
    };

    let ctx = ScanContext {
        client,
        rules: SensitivityRules::default(),
        strategy: Box::new(DefaultStrategy),
        keyword: args.keyword.clone(),
        known_path: args.path.clone(),
        show_sections: args.file.is_none(),
        reporter,
    };

    let mut summary = ScanSummary::new(Utc::now());

    let run = async {
        let mut reports = Vec::with_capacity(targets.len());
        for url in &targets {
            ctx.reporter.set_current(url);
            reports.push(scan_url(&ctx, url).await);
            ctx.reporter.advance();
        }
        reports
    };

    summary.reports = tokio::select! {
        reports = run => reports,
        _ = signal::ctrl_c() => {
            ctx.reporter.finish();
            println!("Exiting");
            return ExitCode::SUCCESS;
        }
    };

    ctx.reporter.finish();
    summary.finish();

    if args.json {
        match output::summary_json(&summary) {
            Ok(json) => println!("{json}"),
            Err(e) => {
                eprintln!("Error : {e}");
                return ExitCode::from(1);
            }
        }
    } else {
        output::print_summary(&summary);
    }

    ExitCode::SUCCESS
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wcdetect={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
