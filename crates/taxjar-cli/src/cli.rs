//! CLI argument definitions for tap-taxjar.
//!
//! # Examples
//!
//! ```bash
//! # Print the stream catalog
//! tap-taxjar --discover
//!
//! # Extract the last 21 days (config file supplies api_key)
//! tap-taxjar --config config.json > transactions.ndjson
//!
//! # One week, retrying transient failures, debug logs on stderr
//! tap-taxjar --config config.json --days-back 7 --max-retries 3 --log-level debug
//! ```

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use taxjar_core::{MissingOrderPolicy, DEFAULT_TIMEOUT_MS};
use tracing::level_filters::LevelFilter;

/// Extract TaxJar transactions as newline-delimited JSON messages.
///
/// Records are written to stdout; logs go to stderr.
#[derive(Debug, Parser)]
#[command(name = "tap-taxjar", author, version, about)]
pub struct Cli {
    /// JSON config file with `api_key` and optional `days_back`, `base_url`, `provider`.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Print the discovery catalog and exit.
    #[arg(long, default_value_t = false)]
    pub discover: bool,

    /// Days to look back from today (overrides config and TAXJAR_DAYS_BACK).
    #[arg(long, allow_negative_numbers = true)]
    pub days_back: Option<i64>,

    /// API base URL (overrides config and TAXJAR_BASE_URL).
    #[arg(long)]
    pub base_url: Option<String>,

    /// Per-request timeout in milliseconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Retries for timeouts, connection failures and 408/429/5xx responses.
    #[arg(long, default_value_t = 0)]
    pub max_retries: u32,

    /// Handling of detail responses without an `order` object.
    #[arg(long, value_enum, default_value_t = MissingOrderArg::Empty)]
    pub missing_order: MissingOrderArg,

    /// Abort instead of skipping when an order detail cannot be loaded.
    #[arg(long, default_value_t = false)]
    pub strict_details: bool,

    /// Log verbosity on stderr.
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MissingOrderArg {
    /// Emit an empty record.
    Empty,
    /// Drop the order.
    Skip,
    /// Abort the run.
    Fail,
}

impl From<MissingOrderArg> for MissingOrderPolicy {
    fn from(value: MissingOrderArg) -> Self {
        match value {
            MissingOrderArg::Empty => Self::EmptyRecord,
            MissingOrderArg::Skip => Self::Skip,
            MissingOrderArg::Fail => Self::Fail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::Error => Self::ERROR,
            LogLevel::Warn => Self::WARN,
            LogLevel::Info => Self::INFO,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Trace => Self::TRACE,
        }
    }
}
