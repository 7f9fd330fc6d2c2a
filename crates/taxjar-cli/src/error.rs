use taxjar_core::ExtractError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Validation(#[from] taxjar_core::ValidationError),

    #[error(transparent)]
    Http(#[from] taxjar_core::HttpError),

    #[error("extraction failed: {0}")]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Sink(#[from] taxjar_core::SinkError),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => 2,
            Self::Validation(_) => 2,
            Self::Http(_) => 3,
            // output failures keep their code when they surface mid-run
            Self::Extract(ExtractError::Sink(_)) => 4,
            Self::Extract(ExtractError::Validation(_)) => 2,
            Self::Extract(_) => 3,
            Self::Sink(_) => 4,
        }
    }
}
