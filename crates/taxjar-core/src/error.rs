use thiserror::Error;

use crate::http_client::HttpError;
use crate::sink::SinkError;

/// Validation errors for extraction inputs.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("days_back must be non-negative, got {value}")]
    NegativeDaysBack { value: i64 },
    #[error("days_back {value} reaches past the supported calendar range")]
    WindowOutOfRange { value: i64 },

    #[error("api key cannot be empty")]
    EmptyApiKey,
    #[error("base url must start with http:// or https://: '{value}'")]
    InvalidBaseUrl { value: String },
    #[error("provider filter cannot be empty")]
    EmptyProvider,

    #[error("order reference cannot be empty")]
    EmptyOrderReference,
}

/// Errors that abort an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("order list request for {date} failed: {source}")]
    ListTransport {
        date: String,
        #[source]
        source: HttpError,
    },
    #[error("order list request for {date} returned status {status}")]
    ListStatus { date: String, status: u16 },
    #[error("order list response for {date} is not valid JSON: {source}")]
    ListBody {
        date: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("order list response for {date} has no 'orders' array")]
    MissingOrders { date: String },
    #[error("order list response for {date} contains an unusable reference: {value}")]
    MalformedReference { date: String, value: String },

    #[error("order detail for '{reference}' could not be loaded: {reason}")]
    DetailFailed { reference: String, reason: String },
    #[error("order detail for '{reference}' has no 'order' object")]
    MissingOrder { reference: String },

    #[error(transparent)]
    Sink(#[from] SinkError),
}
