//! Auth and profile calls built on the gateway.
//!
//! SYSTEM CONTEXT
//! ==============
//! These are the calls that move the session through its lifecycle: login
//! writes it, the tenant guard's profile fetch re-affirms it, logout clears
//! it. Section editors call the gateway directly.

use reqwest::Method;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::error::GatewayError;
use super::gateway::ApiGateway;
use super::types::{Payload, RequestOptions};
use crate::session::Session;

pub const LOGIN_PATH: &str = "/auth/login";
pub const SIGNUP_PATH: &str = "/auth/signup";
pub const SUPERADMIN_LOGIN_PATH: &str = "/superadmin/auth/login";
pub const LOGOUT_PATH: &str = "/auth/logout";

fn tenant_profile_endpoint(tenant_id: &str) -> String {
    format!("/tenants/{tenant_id}/profile")
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    #[serde(default, alias = "tenant_id", deserialize_with = "deserialize_opt_id")]
    tenant_id: Option<String>,
    #[serde(default)]
    user: Option<Value>,
}

/// Tenant ids arrive as strings or bare numbers depending on the endpoint.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

fn credentials_payload(email: &str, password: &str) -> Payload {
    Payload::Json(serde_json::json!({ "email": email, "password": password }))
}

fn parse_login(body: Value) -> Result<LoginResponse, GatewayError> {
    let response: LoginResponse =
        serde_json::from_value(body).map_err(|e| GatewayError::Decode(format!("login response: {e}")))?;
    if response.token.is_empty() {
        return Err(GatewayError::Decode("login response: empty token".into()));
    }
    Ok(response)
}

/// Tenant operator login via `POST /auth/login`.
///
/// On success the token, tenant id and user are written to the session
/// together.
///
/// # Errors
///
/// Returns the gateway error untouched on failure (the interceptor never
/// redirects away from a login attempt), or a decode error if the response
/// carries no token or tenant id.
pub async fn login(gateway: &ApiGateway, email: &str, password: &str) -> Result<Session, GatewayError> {
    let body = gateway.post(LOGIN_PATH, credentials_payload(email, password)).await?;
    let response = parse_login(body)?;
    let Some(tenant_id) = response.tenant_id else {
        return Err(GatewayError::Decode("login response: missing tenantId".into()));
    };

    gateway
        .session()
        .set_credentials(response.token, Some(tenant_id), response.user);
    Ok(gateway.session().snapshot())
}

/// Superadmin login via `POST /superadmin/auth/login`. No tenant is stored.
///
/// # Errors
///
/// Same as [`login`], minus the tenant requirement.
pub async fn superadmin_login(gateway: &ApiGateway, email: &str, password: &str) -> Result<Session, GatewayError> {
    let body = gateway
        .post(SUPERADMIN_LOGIN_PATH, credentials_payload(email, password))
        .await?;
    let response = parse_login(body)?;

    gateway.session().set_credentials(response.token, None, response.user);
    Ok(gateway.session().snapshot())
}

/// Register a new tenant operator via `POST /auth/signup`.
///
/// # Errors
///
/// Returns the gateway error untouched on failure.
pub async fn signup(gateway: &ApiGateway, request: &SignupRequest) -> Result<Value, GatewayError> {
    let payload = serde_json::to_value(request).map_err(|e| GatewayError::Encode(e.to_string()))?;
    gateway.post(SIGNUP_PATH, Payload::Json(payload)).await
}

/// Fetch the profile for `tenant_id` via `GET /tenants/{tenant_id}/profile`.
///
/// # Errors
///
/// Returns the gateway error on failure; auth failures have already cleared
/// the session by the time this returns.
pub async fn fetch_tenant_profile(gateway: &ApiGateway, tenant_id: &str) -> Result<Value, GatewayError> {
    gateway.get(&tenant_profile_endpoint(tenant_id)).await
}

/// Tell the backend about the logout, then clear the session regardless.
///
/// Returns `false` if the persisted copy could not be removed.
pub async fn logout(gateway: &ApiGateway) -> bool {
    if gateway.session().select_token().is_some() {
        if let Err(e) = gateway
            .send(Method::POST, LOGOUT_PATH, None, RequestOptions::default())
            .await
        {
            tracing::debug!(error = %e, "logout call failed; clearing session anyway");
        }
    }
    gateway.session().clear_session()
}

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;
