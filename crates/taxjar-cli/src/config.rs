//! Tap configuration: JSON file, then environment, then command-line flags.
//!
//! | Key | Environment | Flag | Default |
//! |-----|-------------|------|---------|
//! | `api_key` | `TAXJAR_API_KEY` | - | required |
//! | `days_back` | `TAXJAR_DAYS_BACK` | `--days-back` | 21 |
//! | `base_url` | `TAXJAR_BASE_URL` | `--base-url` | `https://api.taxjar.com/v2` |
//! | `provider` | `TAXJAR_PROVIDER` | - | `upsellery` |
//!
//! Blank values count as unset in every layer.

use std::fmt::{Debug, Formatter};
use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use taxjar_core::{
    DetailFailurePolicy, ExtractionWindow, ExtractorConfig, RetryConfig, ValidationError,
    DEFAULT_BASE_URL, DEFAULT_DAYS_BACK, DEFAULT_PROVIDER,
};

use crate::cli::Cli;
use crate::error::CliError;

/// Prefix of the environment overrides (`TAXJAR_API_KEY`, ...).
pub const ENV_PREFIX: &str = "TAXJAR";

/// Environment source for `TAXJAR_*` variables; empty values are ignored.
pub fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .try_parsing(true)
        .ignore_empty(true)
}

/// Config file merged with the environment; unknown keys are ignored.
#[derive(Clone, Default, Deserialize)]
pub struct FileConfig {
    pub api_key: Option<String>,
    pub days_back: Option<i64>,
    pub base_url: Option<String>,
    pub provider: Option<String>,
}

impl FileConfig {
    /// Reads `path` (JSON) if given, then overlays `env`.
    pub fn load(path: Option<&Path>, env: Environment) -> Result<Self, CliError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(
                File::from(path)
                    .format(FileFormat::Json)
                    .required(true),
            );
        }

        builder
            .add_source(env)
            .build()
            .and_then(Config::try_deserialize)
            .map_err(|error| CliError::Config(error.to_string()))
    }
}

/// Fully resolved settings for one run.
#[derive(Clone, PartialEq, Eq)]
pub struct TapConfig {
    pub api_key: String,
    pub days_back: i64,
    pub base_url: String,
    pub provider: String,
}

impl Debug for TapConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("api_key", &"<redacted>")
            .field("days_back", &self.days_back)
            .field("base_url", &self.base_url)
            .field("provider", &self.provider)
            .finish()
    }
}

impl TapConfig {
    pub fn resolve(cli: &Cli) -> Result<Self, CliError> {
        let settings = FileConfig::load(cli.config.as_deref(), environment())?;
        Self::layered(settings, cli)
    }

    fn layered(settings: FileConfig, cli: &Cli) -> Result<Self, CliError> {
        let api_key = non_blank(settings.api_key).ok_or(ValidationError::EmptyApiKey)?;

        let days_back = cli
            .days_back
            .or(settings.days_back)
            .unwrap_or(DEFAULT_DAYS_BACK);
        if days_back < 0 {
            return Err(ValidationError::NegativeDaysBack { value: days_back }.into());
        }

        let base_url = non_blank(cli.base_url.clone())
            .or_else(|| non_blank(settings.base_url))
            .unwrap_or_else(|| String::from(DEFAULT_BASE_URL));

        Ok(Self {
            api_key,
            days_back,
            base_url,
            provider: non_blank(settings.provider)
                .unwrap_or_else(|| String::from(DEFAULT_PROVIDER)),
        })
    }

    /// Window ending today (UTC).
    pub fn window(&self) -> Result<ExtractionWindow, ValidationError> {
        ExtractionWindow::trailing(self.days_back)
    }

    pub fn extractor_config(&self, cli: &Cli) -> ExtractorConfig {
        let retry = if cli.max_retries > 0 {
            RetryConfig::exponential(cli.max_retries)
        } else {
            RetryConfig::no_retry()
        };
        let detail_failures = if cli.strict_details {
            DetailFailurePolicy::Abort
        } else {
            DetailFailurePolicy::Skip
        };

        ExtractorConfig::new(self.api_key.clone())
            .with_base_url(self.base_url.clone())
            .with_provider(self.provider.clone())
            .with_timeout_ms(cli.timeout_ms)
            .with_retry(retry)
            .with_missing_order_policy(cli.missing_order.into())
            .with_detail_failure_policy(detail_failures)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
