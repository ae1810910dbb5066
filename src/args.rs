//! This module defines the command-line arguments for the application.
//! It uses the `clap` crate to parse and validate user input.

use clap::{ArgGroup, Parser};

/// Default user agent, sent unless `--user-agent` overrides it.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

/// Web cache deception and web cache poisoning detector.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(group(ArgGroup::new("target").required(true).args(["url", "file"])))]
pub struct Args {
    /// URL to test.
    #[arg(short, long)]
    pub url: Option<String>,

    /// File of URLs, one per line.
    #[arg(short, long)]
    pub file: Option<String>,

    /// Add a custom HTTP header, e.g. -H "Cookie: session=abc". Repeatable.
    #[arg(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// If you know the sensitive path, e.g. -p my-account. Skips recon.
    #[arg(short, long)]
    pub path: Option<String>,

    /// A keyword that must be present in the poisoned response, e.g. -k codejump.
    #[arg(short, long)]
    pub keyword: Option<String>,

    /// Timeout in seconds for each HTTP request (at least 1).
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: u64,

    /// HTTP proxy to use for requests (e.g., http://127.0.0.1:8080).
    #[arg(long)]
    pub proxy: Option<String>,

    /// User-Agent sent with every request.
    #[arg(short = 'A', long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Print the final summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,

    /// Show debug diagnostics on stderr.
    #[arg(short, long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timeout_must_be_positive() {
        let zero = Args::try_parse_from(["wcdetect", "-u", "http://x.test", "--timeout", "0"]);
        assert!(zero.is_err());

        let args = Args::try_parse_from(["wcdetect", "-u", "http://x.test", "--timeout", "1"]).unwrap();
        assert_eq!(args.timeout, 1);

        let args = Args::try_parse_from(["wcdetect", "-u", "http://x.test"]).unwrap();
        assert_eq!(args.timeout, 10);
    }
}
