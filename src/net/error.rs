//! Gateway and transport errors.

use serde_json::Value;

/// Failure below HTTP semantics: connect, timeout, body read.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The request could not be sent or the response body not read.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within its timeout.
    #[error("request timed out")]
    Timeout,

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    ClientBuild(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() { Self::Timeout } else { Self::Request(e.to_string()) }
    }
}

/// Errors returned by [`crate::net::ApiGateway`] calls.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Non-success status the gateway did not handle globally.
    #[error("API response error: status {status}")]
    Status { status: u16, body: Value },

    /// The backend rejected the session; the session was cleared and a
    /// login redirect emitted.
    #[error("session rejected: status {status}")]
    SessionRejected { status: u16, body: Value },

    /// The JSON payload could not be serialized.
    #[error("request body encode failed: {0}")]
    Encode(String),

    /// A success response body was not valid JSON.
    #[error("API response parse failed: {0}")]
    Decode(String),

    #[error("invalid header: {0}")]
    InvalidHeader(String),

    #[error("invalid request URL: {0}")]
    InvalidUrl(String),
}

impl GatewayError {
    /// HTTP status carried by the error, if the backend answered at all.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::SessionRejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the backend answered 401/403, globally handled or not.
    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    /// Backend-provided message, falling back to the error code.
    #[must_use]
    pub fn server_message(&self) -> Option<String> {
        let (Self::Status { body, .. } | Self::SessionRejected { body, .. }) = self else {
            return None;
        };
        let parsed = super::types::ApiErrorBody::from_value(body);
        parsed.message.or(parsed.error)
    }
}
