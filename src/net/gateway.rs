//! The single outbound channel to the CMS backend.
//!
//! ARCHITECTURE
//! ============
//! Every backend call goes through `ApiGateway::send`, which:
//! 1. resolves the URL against the configured base,
//! 2. attaches the bearer token unless the path is public,
//! 3. always attaches `X-Tenant-Domain` from the current location's hostname,
//! 4. sets `Content-Type: application/json` only for JSON payloads,
//! 5. dispatches and decodes the JSON body.
//!
//! Failed responses run through `interceptor::classify`. A forced logout
//! clears the session and emits a login navigation intent before the error
//! is returned, so no view can keep rendering with a dead token.
//!
//! ERROR HANDLING
//! ==============
//! There are no retries. A failed request fails once and is reported to the
//! caller, which owns any user-facing messaging.

use std::sync::Arc;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;

use super::error::{GatewayError, TransportError};
use super::interceptor::{Interception, classify, is_public_path};
use super::transport::{ReqwestTransport, Transport, TransportBody, TransportRequest, TransportResponse};
use super::types::{ApiErrorBody, Payload, RequestOptions};
use crate::config::GatewayConfig;
use crate::nav::{NavigationReason, Navigator};
use crate::session::SessionStore;

pub const TENANT_DOMAIN_HEADER: HeaderName = HeaderName::from_static("x-tenant-domain");

pub struct ApiGateway {
    config: GatewayConfig,
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    transport: Arc<dyn Transport>,
}

impl ApiGateway {
    #[must_use]
    pub fn new(
        config: GatewayConfig,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self { config, session, navigator, transport }
    }

    /// Build a gateway over a real `reqwest` transport.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_reqwest(
        config: GatewayConfig,
        session: Arc<SessionStore>,
        navigator: Arc<Navigator>,
    ) -> Result<Self, TransportError> {
        let transport = ReqwestTransport::new(config.timeouts)?;
        Ok(Self::new(config, session, navigator, Arc::new(transport)))
    }

    #[must_use]
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    #[must_use]
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<Navigator> {
        &self.navigator
    }

    /// `GET path`.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::send`].
    pub async fn get(&self, path: &str) -> Result<Value, GatewayError> {
        self.send(Method::GET, path, None, RequestOptions::default()).await
    }

    /// `POST path` with `payload`.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::send`].
    pub async fn post(&self, path: &str, payload: Payload) -> Result<Value, GatewayError> {
        self.send(Method::POST, path, Some(payload), RequestOptions::default()).await
    }

    /// `PUT path` with `payload`.
    ///
    /// # Errors
    ///
    /// See [`ApiGateway::send`].
    pub async fn put(&self, path: &str, payload: Payload) -> Result<Value, GatewayError> {
        self.send(Method::PUT, path, Some(payload), RequestOptions::default()).await
    }

    /// Send a request to the backend and decode the JSON response.
    ///
    /// # Errors
    ///
    /// - [`GatewayError::SessionRejected`] after a forced logout,
    /// - [`GatewayError::Status`] for any other non-success status,
    /// - [`GatewayError::Transport`] when no response arrived,
    /// - build/decode errors for malformed input or bodies.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<Value, GatewayError> {
        let request = self.build_request(method, path, payload, options)?;
        tracing::debug!(method = %request.method, %path, "dispatching api request");

        let response = self.transport.send(request).await.map_err(|e| {
            tracing::warn!(%path, error = %e, "api transport failed");
            GatewayError::from(e)
        })?;
        self.handle_response(path, response)
    }

    fn build_request(
        &self,
        method: Method,
        path: &str,
        payload: Option<Payload>,
        options: RequestOptions,
    ) -> Result<TransportRequest, GatewayError> {
        let url = resolve_url(&self.config.base_url, path, &options.query)?;
        let mut headers = HeaderMap::new();

        if !is_public_path(path, &self.config.public_paths) {
            if let Some(token) = self.session.select_token() {
                headers.insert(AUTHORIZATION, header_value(&format!("Bearer {token}"))?);
            }
        }
        headers.insert(TENANT_DOMAIN_HEADER, header_value(&self.navigator.location().hostname)?);

        let body = match payload {
            None => TransportBody::Empty,
            Some(Payload::Json(value)) => {
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
                TransportBody::Bytes(serde_json::to_vec(&value).map_err(|e| GatewayError::Encode(e.to_string()))?)
            }
            Some(Payload::Multipart(form)) => TransportBody::Multipart(form),
            Some(Payload::Binary(bytes)) => TransportBody::Bytes(bytes),
        };

        for (name, value) in &options.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| GatewayError::InvalidHeader(format!("{name}: {e}")))?;
            headers.insert(name, header_value(value)?);
        }

        Ok(TransportRequest { method, url, headers, body, timeout: options.timeout })
    }

    fn handle_response(&self, path: &str, response: TransportResponse) -> Result<Value, GatewayError> {
        let status = response.status;
        if (200..300).contains(&status) {
            if response.body.iter().all(u8::is_ascii_whitespace) {
                return Ok(Value::Null);
            }
            return serde_json::from_slice(&response.body).map_err(|e| GatewayError::Decode(e.to_string()));
        }

        let body = error_body(&response.body);
        let parsed = ApiErrorBody::from_value(&body);
        match classify(path, status, &parsed, &self.config.auth_paths) {
            Interception::ForceLogout => {
                tracing::warn!(%path, status, error_code = ?parsed.error, "backend rejected session; logging out");
                self.session.clear_session();
                let route = self.navigator.current_login_route();
                self.navigator.redirect_to_login(route, false, NavigationReason::SessionRejected);
                Err(GatewayError::SessionRejected { status, body })
            }
            Interception::PassThrough => {
                tracing::debug!(%path, status, error_code = ?parsed.error, "api request failed");
                Err(GatewayError::Status { status, body })
            }
        }
    }
}

fn header_value(raw: &str) -> Result<HeaderValue, GatewayError> {
    HeaderValue::from_str(raw).map_err(|e| GatewayError::InvalidHeader(e.to_string()))
}

/// Error bodies are JSON when the backend produced them; proxies may not.
fn error_body(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(raw).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(raw).into_owned()))
}

pub(crate) fn resolve_url(base_url: &str, path: &str, query: &[(String, String)]) -> Result<String, GatewayError> {
    if !path.starts_with('/') {
        return Err(GatewayError::InvalidUrl(format!("path must start with '/': {path}")));
    }
    let mut url = reqwest::Url::parse(&format!("{base_url}{path}"))
        .map_err(|e| GatewayError::InvalidUrl(format!("{path}: {e}")))?;
    if !query.is_empty() {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in query {
            pairs.append_pair(key, value);
        }
    }
    Ok(url.into())
}

#[cfg(test)]
#[path = "gateway_test.rs"]
mod gateway_test;
