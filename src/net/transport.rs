//! HTTP transport seam under the gateway.
//!
//! DESIGN
//! ======
//! The gateway decides headers, payload encoding and failure handling; the
//! transport only moves bytes. Keeping it behind a trait lets tests drive
//! the gateway and guards with scripted responses instead of a live backend.

use std::time::Duration;

use reqwest::Method;
use reqwest::header::HeaderMap;

use super::error::TransportError;
use super::types::{MultipartForm, PartBody};
use crate::config::Timeouts;

#[derive(Debug, Clone)]
pub enum TransportBody {
    Empty,
    Bytes(Vec<u8>),
    Multipart(MultipartForm),
}

/// Fully resolved request as the gateway hands it to the transport.
#[derive(Debug, Clone)]
pub struct TransportRequest {
    pub method: Method,
    pub url: String,
    pub headers: HeaderMap,
    pub body: TransportBody,
    pub timeout: Option<Duration>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    /// Dispatch a request and return the raw status and body.
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] if no HTTP response was received.
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

// =============================================================================
// REQWEST
// =============================================================================

pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the configured request/connect timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(timeouts: Timeouts) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeouts.request())
            .connect_timeout(timeouts.connect())
            .build()
            .map_err(|e| TransportError::ClientBuild(e.to_string()))?;
        Ok(Self { http })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method, &request.url)
            .headers(request.headers);
        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match request.body {
            TransportBody::Empty => builder,
            TransportBody::Bytes(bytes) => builder.body(bytes),
            TransportBody::Multipart(form) => builder.multipart(to_reqwest_form(form)?),
        };

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(TransportResponse { status, body })
    }
}

fn to_reqwest_form(form: MultipartForm) -> Result<reqwest::multipart::Form, TransportError> {
    let mut out = reqwest::multipart::Form::new();
    for part in form.parts {
        out = match part.body {
            PartBody::Text(value) => out.text(part.name, value),
            PartBody::File { file_name, mime, bytes } => {
                let mut file = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file
                        .mime_str(&mime)
                        .map_err(|e| TransportError::Request(format!("invalid mime type {mime}: {e}")))?;
                }
                out.part(part.name, file)
            }
        };
    }
    Ok(out)
}
