//! Request payloads, per-call options and the backend error body.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of an outbound request.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Structured body; sent with `Content-Type: application/json`.
    Json(Value),
    /// Form upload; the transport sets the boundary header.
    Multipart(MultipartForm),
    /// Raw bytes; no content type is set.
    Binary(Vec<u8>),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartForm {
    pub parts: Vec<Part>,
}

impl MultipartForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(Part { name: name.into(), body: PartBody::Text(value.into()) });
        self
    }

    #[must_use]
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        mime: Option<String>,
        bytes: Vec<u8>,
    ) -> Self {
        self.parts.push(Part {
            name: name.into(),
            body: PartBody::File { file_name: file_name.into(), mime, bytes },
        });
        self
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    pub name: String,
    pub body: PartBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    File { file_name: String, mime: Option<String>, bytes: Vec<u8> },
}

/// Per-call overrides layered on top of the gateway defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Extra headers, applied after the gateway's own headers.
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    /// Overrides the transport's configured request timeout.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Error body the backend returns on failure, e.g.
/// `{"error": "INVALID_TOKEN", "message": "Token expired"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ApiErrorBody {
    /// Parse leniently: anything that is not an object with string fields
    /// yields an empty body.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let field = |name: &str| value.get(name).and_then(Value::as_str).map(ToOwned::to_owned);
        Self { error: field("error"), message: field("message") }
    }
}

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;
