//! # taxjar-core
//!
//! Extraction engine for TaxJar transactions.
//!
//! ## Overview
//!
//! A run covers an [`ExtractionWindow`] of UTC calendar days. For each day
//! the engine lists the day's order references, fetches every order's detail
//! and hands each detail object to a [`RecordSink`] as soon as it arrives.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`window`] | Inclusive day range and its lazy iterator |
//! | [`extractor`] | List-then-detail fetch loop and its policies |
//! | [`domain`] | Order references, records, detail outcomes |
//! | [`sink`] | Record consumer contract |
//! | [`report`] | Per-day and per-run counts |
//! | [`schema`] | Stream name, key properties, JSON schema |
//! | [`http_client`] | HTTP transport abstraction and reqwest client |
//! | [`retry`] | Opt-in retry with backoff |
//! | [`error`] | Validation and extraction errors |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use taxjar_core::{
//!     CollectingSink, ExtractionWindow, ExtractorConfig, ReqwestHttpClient,
//!     TransactionsExtractor,
//! };
//!
//! let extractor = TransactionsExtractor::new(
//!     ExtractorConfig::new(api_key),
//!     Arc::new(ReqwestHttpClient::new()?),
//! )?;
//! let mut sink = CollectingSink::new();
//! let report = extractor.run(&ExtractionWindow::trailing(21)?, &mut sink).await?;
//! println!("{} records", report.emitted());
//! ```
//!
//! ## Error Handling
//!
//! | Failure | Effect |
//! |---------|--------|
//! | List request transport error, bad status, bad body | Run aborts with [`ExtractError`] |
//! | Blank list entry | Entry skipped, unless [`DetailFailurePolicy::Abort`] |
//! | Detail request failure | Order skipped ([`SkipReason`]), unless [`DetailFailurePolicy::Abort`] |
//! | Detail without `order` key | Empty record, per [`MissingOrderPolicy`] |
//! | Sink error | Run aborts |

pub mod domain;
pub mod error;
pub mod extractor;
pub mod http_client;
pub mod report;
pub mod retry;
pub mod schema;
pub mod sink;
pub mod window;

pub use domain::{DetailOutcome, ListedOrder, OrderReference, SkipReason, TransactionRecord};
pub use error::{ExtractError, ValidationError};
pub use extractor::{
    DetailFailurePolicy, ExtractorConfig, MissingOrderPolicy, TransactionsExtractor,
    DEFAULT_BASE_URL, DEFAULT_PROVIDER, DEFAULT_TIMEOUT_MS,
};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse, ReqwestHttpClient,
};
pub use report::{DaySummary, ExtractionReport, SkippedOrder};
pub use retry::{Backoff, RetryConfig};
pub use sink::{CollectingSink, RecordSink, SinkError};
pub use window::{query_date, ExtractionWindow, WindowDays, DEFAULT_DAYS_BACK};
