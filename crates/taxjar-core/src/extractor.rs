//! Two-phase transaction extraction: list the orders of each day, then fetch
//! every order's detail and hand it to a [`RecordSink`].
//!
//! Requests are issued strictly one after another. A failed list request ends
//! the run; a failed detail request only drops that order (see
//! [`DetailFailurePolicy`]).

use std::sync::Arc;

use serde_json::Value;
use time::Date;
use tracing::{debug, info, warn};

use crate::domain::{DetailOutcome, ListedOrder, OrderReference, SkipReason, TransactionRecord};
use crate::error::{ExtractError, ValidationError};
use crate::http_client::{HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse};
use crate::report::{DaySummary, ExtractionReport, SkippedOrder};
use crate::retry::RetryConfig;
use crate::sink::RecordSink;
use crate::window::{query_date, ExtractionWindow};

pub const DEFAULT_BASE_URL: &str = "https://api.taxjar.com/v2";
pub const DEFAULT_PROVIDER: &str = "upsellery";
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// What to do with a successful detail response that has no `order` key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingOrderPolicy {
    /// Emit an empty record.
    #[default]
    EmptyRecord,
    /// Drop the reference with [`SkipReason::MissingOrder`].
    Skip,
    /// Abort the run.
    Fail,
}

/// What to do when a detail request fails or returns an unusable body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DetailFailurePolicy {
    #[default]
    Skip,
    Abort,
}

/// Everything the extractor needs besides a transport.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub base_url: String,
    pub provider: String,
    pub auth: HttpAuth,
    pub timeout_ms: u64,
    pub retry: RetryConfig,
    pub missing_order: MissingOrderPolicy,
    pub detail_failures: DetailFailurePolicy,
}

impl ExtractorConfig {
    /// Defaults for the public API, authenticated with `api_key` as a bearer token.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            provider: String::from(DEFAULT_PROVIDER),
            auth: HttpAuth::BearerToken(api_key.into()),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry: RetryConfig::no_retry(),
            missing_order: MissingOrderPolicy::default(),
            detail_failures: DetailFailurePolicy::default(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_owned();
        self
    }

    pub fn with_provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = provider.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_missing_order_policy(mut self, policy: MissingOrderPolicy) -> Self {
        self.missing_order = policy;
        self
    }

    pub fn with_detail_failure_policy(mut self, policy: DetailFailurePolicy) -> Self {
        self.detail_failures = policy;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let HttpAuth::BearerToken(token) = &self.auth {
            if token.trim().is_empty() {
                return Err(ValidationError::EmptyApiKey);
            }
        }

        if !(self.base_url.starts_with("https://") || self.base_url.starts_with("http://")) {
            return Err(ValidationError::InvalidBaseUrl {
                value: self.base_url.clone(),
            });
        }

        if self.provider.trim().is_empty() {
            return Err(ValidationError::EmptyProvider);
        }

        Ok(())
    }
}

/// Extraction engine for the `transactions` stream.
#[derive(Clone)]
pub struct TransactionsExtractor {
    config: ExtractorConfig,
    http_client: Arc<dyn HttpClient>,
}

impl TransactionsExtractor {
    pub fn new(
        config: ExtractorConfig,
        http_client: Arc<dyn HttpClient>,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self {
            config,
            http_client,
        })
    }

    /// Walks the whole window, emitting records as they arrive.
    ///
    /// On error, records of earlier days (and earlier orders of the failing
    /// day) have already reached the sink.
    pub async fn run<S>(
        &self,
        window: &ExtractionWindow,
        sink: &mut S,
    ) -> Result<ExtractionReport, ExtractError>
    where
        S: RecordSink + ?Sized,
    {
        info!(
            window = %window,
            days = window.day_count(),
            provider = %self.config.provider,
            "starting transactions extraction"
        );

        let mut report = ExtractionReport::default();
        for day in window.days() {
            let summary = self.run_day(day, sink).await?;
            report.days.push(summary);
        }

        info!(
            emitted = report.emitted(),
            skipped = report.skipped(),
            "transactions extraction finished"
        );
        Ok(report)
    }

    /// Lists one day's orders and emits each loadable detail.
    pub async fn run_day<S>(&self, day: Date, sink: &mut S) -> Result<DaySummary, ExtractError>
    where
        S: RecordSink + ?Sized,
    {
        let listed = self.list_orders(day).await?;
        let mut summary = DaySummary::new(day, listed.len());

        for entry in listed {
            let (reference, outcome) = match entry {
                ListedOrder::Reference(reference) => {
                    let outcome = self.fetch_detail(&reference).await?;
                    (reference.to_string(), outcome)
                }
                ListedOrder::Blank(raw) => {
                    let outcome = self.escalate(&raw, SkipReason::BlankReference)?;
                    (raw, outcome)
                }
            };

            match outcome {
                DetailOutcome::Emitted(record) => {
                    sink.emit(record)?;
                    summary.loaded += 1;
                }
                DetailOutcome::Skipped(reason) => {
                    debug!(reference = %reference, reason = %reason, "order detail skipped");
                    summary.skipped.push(SkippedOrder { reference, reason });
                }
            }
        }

        info!("Loaded {} transactions from {}", summary.loaded, summary.query_date());
        Ok(summary)
    }

    /// Order list recorded on `day`, in response order. Every request or
    /// body failure here is fatal; blank entries are kept for the caller.
    pub async fn list_orders(&self, day: Date) -> Result<Vec<ListedOrder>, ExtractError> {
        let date = query_date(day);
        info!("Fetching transactions from {date}");

        let request = self
            .request(format!("{}/transactions/orders", self.config.base_url))
            .with_query("transaction_date", date.as_str())
            .with_query("provider", self.config.provider.as_str());

        let response = self
            .send(request)
            .await
            .map_err(|source| ExtractError::ListTransport {
                date: date.clone(),
                source,
            })?;

        if !response.is_success() {
            return Err(ExtractError::ListStatus {
                date,
                status: response.status,
            });
        }

        let body: Value =
            serde_json::from_str(&response.body).map_err(|source| ExtractError::ListBody {
                date: date.clone(),
                source,
            })?;

        let Some(orders) = body.get("orders").and_then(Value::as_array) else {
            return Err(ExtractError::MissingOrders { date });
        };

        orders
            .iter()
            .map(|value| {
                ListedOrder::from_json(value).ok_or_else(|| ExtractError::MalformedReference {
                    date: date.clone(),
                    value: value.to_string(),
                })
            })
            .collect()
    }

    /// Fetches one order. Failures become [`DetailOutcome::Skipped`] unless
    /// the configured policies escalate them.
    pub async fn fetch_detail(
        &self,
        reference: &OrderReference,
    ) -> Result<DetailOutcome, ExtractError> {
        let request = self
            .request(format!(
                "{}/transactions/orders/{}",
                self.config.base_url,
                urlencoding::encode(reference.as_str())
            ))
            .with_query("provider", self.config.provider.as_str());

        let outcome = match self.send(request).await {
            Err(error) => DetailOutcome::Skipped(SkipReason::Transport(error.to_string())),
            Ok(response) if !response.is_success() => {
                DetailOutcome::Skipped(SkipReason::Status(response.status))
            }
            Ok(response) => self.parse_detail(reference, &response.body)?,
        };

        match outcome {
            DetailOutcome::Skipped(reason) => self.escalate(reference.as_str(), reason),
            outcome => Ok(outcome),
        }
    }

    /// Applies [`DetailFailurePolicy`] to an order that produced no record.
    /// A skipped missing `order` is already the policy's decision.
    fn escalate(
        &self,
        reference: &str,
        reason: SkipReason,
    ) -> Result<DetailOutcome, ExtractError> {
        if self.config.detail_failures == DetailFailurePolicy::Abort
            && reason != SkipReason::MissingOrder
        {
            return Err(ExtractError::DetailFailed {
                reference: reference.to_owned(),
                reason: reason.to_string(),
            });
        }
        Ok(DetailOutcome::Skipped(reason))
    }

    fn parse_detail(
        &self,
        reference: &OrderReference,
        body: &str,
    ) -> Result<DetailOutcome, ExtractError> {
        let payload = match serde_json::from_str::<Value>(body) {
            Ok(payload) => payload,
            Err(error) => {
                return Ok(DetailOutcome::Skipped(SkipReason::MalformedBody(
                    error.to_string(),
                )))
            }
        };

        let Value::Object(mut fields) = payload else {
            return Ok(DetailOutcome::Skipped(SkipReason::MalformedBody(
                String::from("response body is not a JSON object"),
            )));
        };

        match fields.remove("order") {
            Some(Value::Object(order)) => {
                Ok(DetailOutcome::Emitted(TransactionRecord::from_map(order)))
            }
            Some(other) => Ok(DetailOutcome::Skipped(SkipReason::MalformedBody(format!(
                "'order' is {}, expected an object",
                json_kind(&other)
            )))),
            None => match self.config.missing_order {
                MissingOrderPolicy::EmptyRecord => {
                    Ok(DetailOutcome::Emitted(TransactionRecord::empty()))
                }
                MissingOrderPolicy::Skip => Ok(DetailOutcome::Skipped(SkipReason::MissingOrder)),
                MissingOrderPolicy::Fail => Err(ExtractError::MissingOrder {
                    reference: reference.to_string(),
                }),
            },
        }
    }

    fn request(&self, url: String) -> HttpRequest {
        HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_auth(&self.config.auth)
            .with_timeout_ms(self.config.timeout_ms)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, HttpError> {
        let retry = &self.config.retry;
        let mut attempt = 0;

        loop {
            debug!(url = %request.url, attempt, "sending request");
            let result = self.http_client.execute(request.clone()).await;

            let retryable = match &result {
                Ok(response) => retry.should_retry_status(response.status),
                Err(error) => retry.should_retry_error(error),
            };
            if !retryable || attempt >= retry.max_retries {
                return result;
            }

            let delay = retry.delay_for_attempt(attempt);
            match &result {
                Ok(response) => warn!(
                    url = %request.url,
                    status = response.status,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request"
                ),
                Err(error) => warn!(
                    url = %request.url,
                    error = %error,
                    delay_ms = delay.as_millis() as u64,
                    "retrying request"
                ),
            }
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
