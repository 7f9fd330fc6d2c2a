use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ValidationError;

/// Identifier returned by the order list endpoint for one day.
///
/// Only meaningful as the path segment of the matching detail lookup.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderReference(String);

impl OrderReference {
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.trim().is_empty() {
            return Err(ValidationError::EmptyOrderReference);
        }
        Ok(Self(input.to_owned()))
    }

    /// Accepts the element shapes the list endpoint is known to return:
    /// strings, and integers rendered as their decimal text.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => Self::parse(text).ok(),
            Value::Number(number) if number.is_i64() || number.is_u64() => {
                Some(Self(number.to_string()))
            }
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for OrderReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One element of a day's order list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListedOrder {
    Reference(OrderReference),
    /// A blank string: there is nothing to look up.
    Blank(String),
}

impl ListedOrder {
    /// `None` for elements that are neither strings nor integers.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) if text.trim().is_empty() => Some(Self::Blank(text.clone())),
            other => OrderReference::from_json(other).map(Self::Reference),
        }
    }
}

/// One transaction, exactly as the detail endpoint returned its `order` object.
///
/// Field order and unknown fields survive; monetary amounts stay strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRecord(Map<String, Value>);

impl TransactionRecord {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self(fields)
    }

    pub fn transaction_id(&self) -> Option<&str> {
        self.0.get("transaction_id").and_then(Value::as_str)
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Why a detail fetch produced no record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The detail endpoint answered with a non-success status.
    Status(u16),
    /// The request never produced a response.
    Transport(String),
    /// Success status, but the body was not JSON or `order` was not an object.
    MalformedBody(String),
    /// Success status without an `order` key, under a policy that skips it.
    MissingOrder,
    /// The list returned a blank reference; no detail request was made.
    BlankReference,
}

impl Display for SkipReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status(status) => write!(f, "upstream returned status {status}"),
            Self::Transport(message) => write!(f, "transport error: {message}"),
            Self::MalformedBody(message) => write!(f, "malformed body: {message}"),
            Self::MissingOrder => f.write_str("response has no 'order' object"),
            Self::BlankReference => f.write_str("order list returned a blank reference"),
        }
    }
}

/// Outcome of fetching one order detail.
#[derive(Debug, Clone, PartialEq)]
pub enum DetailOutcome {
    Emitted(TransactionRecord),
    Skipped(SkipReason),
}
