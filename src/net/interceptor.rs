//! Response/request rules applied to every gateway call.
//!
//! SYSTEM CONTEXT
//! ==============
//! This is the only place that decides whether a failed response means
//! "the session is gone". Callers never see a redirect decision; the gateway
//! applies `Interception::ForceLogout` by clearing the session and emitting a
//! navigation intent.
//!
//! Rules:
//! - login/signup endpoints always pass through, so a login form can show
//!   its own "wrong password" message,
//! - otherwise 401/403 with an auth-failure marker forces a logout,
//! - everything else passes through to the caller.

use super::types::ApiErrorBody;

/// Error codes meaning the token is unusable for this request.
pub const SESSION_FAILURE_CODES: &[&str] = &["INVALID_TOKEN", "TOKEN_EXPIRED", "AUTH_REQUIRED", "INSUFFICIENT_PRIVILEGES"];

/// Message fragments that mark a session failure. Matched case-sensitively.
pub const SESSION_FAILURE_FRAGMENTS: &[&str] = &["expired", "Invalid"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    PassThrough,
    ForceLogout,
}

/// Strip query/fragment and trailing slashes. `/` stays `/`.
#[must_use]
pub fn normalize_path(path: &str) -> &str {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() && path.starts_with('/') { "/" } else { trimmed }
}

fn path_in(path: &str, set: &[String]) -> bool {
    let path = normalize_path(path);
    set.iter().any(|candidate| normalize_path(candidate) == path)
}

/// Public endpoints never receive a bearer token.
#[must_use]
pub fn is_public_path(path: &str, public_paths: &[String]) -> bool {
    path_in(path, public_paths)
}

/// Login/signup endpoints whose auth failures belong to the caller.
#[must_use]
pub fn is_auth_endpoint(path: &str, auth_paths: &[String]) -> bool {
    path_in(path, auth_paths)
}

#[must_use]
pub fn signals_session_failure(status: u16, body: &ApiErrorBody) -> bool {
    if status != 401 && status != 403 {
        return false;
    }
    let code_matches = body
        .error
        .as_deref()
        .is_some_and(|code| SESSION_FAILURE_CODES.contains(&code));
    let message_matches = body
        .message
        .as_deref()
        .is_some_and(|msg| SESSION_FAILURE_FRAGMENTS.iter().any(|f| msg.contains(f)));
    code_matches || message_matches
}

/// Decide how the gateway treats a failed response to `path`.
#[must_use]
pub fn classify(path: &str, status: u16, body: &ApiErrorBody, auth_paths: &[String]) -> Interception {
    if is_auth_endpoint(path, auth_paths) {
        return Interception::PassThrough;
    }
    if signals_session_failure(status, body) {
        Interception::ForceLogout
    } else {
        Interception::PassThrough
    }
}

#[cfg(test)]
#[path = "interceptor_test.rs"]
mod interceptor_test;
