use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Authentication strategy applied to outgoing HTTP requests.
#[derive(Clone, PartialEq, Eq)]
pub enum HttpAuth {
    None,
    BearerToken(String),
    Header { name: String, value: String },
}

impl HttpAuth {
    pub fn apply(&self, headers: &mut BTreeMap<String, String>) {
        match self {
            Self::None => {}
            Self::BearerToken(token) => {
                headers.insert(String::from("authorization"), format!("Bearer {token}"));
            }
            Self::Header { name, value } => {
                headers.insert(name.to_ascii_lowercase(), value.clone());
            }
        }
    }
}

// Credentials must never reach logs through `{:?}`.
impl std::fmt::Debug for HttpAuth {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::BearerToken(_) => f.write_str("BearerToken(<redacted>)"),
            Self::Header { name, .. } => write!(f, "Header({name}: <redacted>)"),
        }
    }
}

/// GET request envelope handed to an [`HttpClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub timeout_ms: u64,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            headers: BTreeMap::new(),
            timeout_ms: 30_000,
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    pub fn with_auth(mut self, auth: &HttpAuth) -> Self {
        auth.apply(&mut self.headers);
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Looks up a query parameter by name (first occurrence).
    pub fn query_value(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// URL with the percent-encoded query string appended.
    pub fn full_url(&self) -> String {
        if self.query.is_empty() {
            return self.url.clone();
        }

        let query = self
            .query
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.url, query)
    }
}

/// HTTP response envelope returned by a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn ok_json(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }
}

/// Coarse classification of transport failures, used by retry decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpErrorKind {
    Timeout,
    Connect,
    Body,
    Other,
}

/// Transport-level HTTP error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpError {
    kind: HttpErrorKind,
    message: String,
}

impl HttpError {
    pub fn new(kind: HttpErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Timeout, message)
    }

    pub fn connect(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Connect, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(HttpErrorKind::Other, message)
    }

    pub const fn kind(&self) -> HttpErrorKind {
        self.kind
    }
}

impl Display for HttpError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HttpError {}

/// Transport contract used by the extractor; one call per outbound request.
pub trait HttpClient: Send + Sync {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;
}

/// Production HTTP client backed by reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    client: Arc<reqwest::Client>,
}

impl ReqwestHttpClient {
    pub fn new() -> Result<Self, HttpError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tap-taxjar/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|error| HttpError::other(format!("failed to build http client: {error}")))?;

        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

impl HttpClient for ReqwestHttpClient {
    fn execute<'a>(
        &'a self,
        request: HttpRequest,
    ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
        Box::pin(async move {
            let mut builder = self
                .client
                .get(request.full_url())
                .timeout(Duration::from_millis(request.timeout_ms));

            for (name, value) in &request.headers {
                builder = builder.header(name, value);
            }

            let response = builder.send().await.map_err(|error| {
                if error.is_timeout() {
                    HttpError::timeout(format!("request timeout: {error}"))
                } else if error.is_connect() {
                    HttpError::connect(format!("connection failed: {error}"))
                } else {
                    HttpError::other(format!("request failed: {error}"))
                }
            })?;

            let status = response.status().as_u16();
            let body = response.text().await.map_err(|error| {
                HttpError::new(
                    HttpErrorKind::Body,
                    format!("failed to read response body: {error}"),
                )
            })?;

            Ok(HttpResponse { status, body })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_auth_populates_authorization_header() {
        let request = HttpRequest::get("https://api.taxjar.test/v2/transactions/orders")
            .with_auth(&HttpAuth::BearerToken(String::from("token-123")));

        assert_eq!(
            request.headers.get("authorization").map(String::as_str),
            Some("Bearer token-123")
        );
    }

    #[test]
    fn full_url_percent_encodes_slashes_in_query_values() {
        let request = HttpRequest::get("https://api.taxjar.test/v2/transactions/orders")
            .with_query("transaction_date", "2024/03/09")
            .with_query("provider", "upsellery");

        assert_eq!(
            request.full_url(),
            "https://api.taxjar.test/v2/transactions/orders?transaction_date=2024%2F03%2F09&provider=upsellery"
        );
        assert_eq!(request.query_value("provider"), Some("upsellery"));
    }

    #[test]
    fn full_url_without_query_is_unchanged() {
        let request = HttpRequest::get("https://api.taxjar.test/v2/transactions/orders/7");
        assert_eq!(request.full_url(), "https://api.taxjar.test/v2/transactions/orders/7");
    }

    #[test]
    fn header_auth_lowercases_the_header_name() {
        let request = HttpRequest::get("https://api.taxjar.test/v2/transactions/orders").with_auth(
            &HttpAuth::Header {
                name: String::from("X-Api-Key"),
                value: String::from("token-123"),
            },
        );

        assert_eq!(
            request.headers.get("x-api-key").map(String::as_str),
            Some("token-123")
        );
        assert!(HttpRequest::get("https://api.taxjar.test/v2")
            .with_auth(&HttpAuth::None)
            .headers
            .is_empty());
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let auth = HttpAuth::BearerToken(String::from("super-secret"));
        let rendered = format!("{auth:?}");
        assert!(!rendered.contains("super-secret"));
    }
}
