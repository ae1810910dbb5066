//! Error types returned while scanning a single target.
//!
//! Per-request failures inside recon and probe loops are swallowed where they
//! happen; only failures that stop a whole target surface as a `ScanError`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    /// The target could not be parsed as an absolute URL.
    #[error("invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("cannot read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A `-H` value that cannot be sent as an HTTP header.
    #[error("invalid header '{0}'")]
    InvalidHeader(String),
}

pub type ScanResult<T> = Result<T, ScanError>;
