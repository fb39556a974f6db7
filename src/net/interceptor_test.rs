use super::*;
use crate::config::{DEFAULT_AUTH_PATHS, DEFAULT_PUBLIC_PATHS};

fn paths(list: &[&str]) -> Vec<String> {
    list.iter().map(|p| (*p).to_owned()).collect()
}

fn body(error: Option<&str>, message: Option<&str>) -> ApiErrorBody {
    ApiErrorBody { error: error.map(ToOwned::to_owned), message: message.map(ToOwned::to_owned) }
}

// =============================================================================
// normalize_path
// =============================================================================

#[test]
fn normalize_strips_query_fragment_and_trailing_slash() {
    assert_eq!(normalize_path("/auth/login/?next=/x"), "/auth/login");
    assert_eq!(normalize_path("/blog#top"), "/blog");
    assert_eq!(normalize_path("/"), "/");
    assert_eq!(normalize_path("/?q=1"), "/");
}

// =============================================================================
// public / auth endpoints
// =============================================================================

#[test]
fn public_paths_match_exactly() {
    let public = paths(DEFAULT_PUBLIC_PATHS);
    assert!(is_public_path("/auth/login", &public));
    assert!(is_public_path("/auth/signup?ref=home", &public));
    assert!(!is_public_path("/auth/login/extra", &public));
    assert!(!is_public_path("/tenants/42/profile", &public));
}

#[test]
fn auth_endpoints_cover_login_and_signup() {
    let auth = paths(DEFAULT_AUTH_PATHS);
    assert!(is_auth_endpoint("/auth/login", &auth));
    assert!(is_auth_endpoint("/auth/signup/", &auth));
    assert!(is_auth_endpoint("/superadmin/auth/login", &auth));
    assert!(!is_auth_endpoint("/auth/forgot-password", &auth));
}

// =============================================================================
// signals_session_failure
// =============================================================================

#[test]
fn failure_codes_trigger_on_401_and_403() {
    for code in SESSION_FAILURE_CODES {
        assert!(signals_session_failure(401, &body(Some(*code), None)), "401 {code}");
        assert!(signals_session_failure(403, &body(Some(*code), None)), "403 {code}");
    }
}

#[test]
fn message_fragments_trigger() {
    assert!(signals_session_failure(401, &body(None, Some("Token has expired"))));
    assert!(signals_session_failure(403, &body(None, Some("Invalid signature"))));
}

#[test]
fn message_match_is_case_sensitive() {
    assert!(!signals_session_failure(401, &body(None, Some("invalid password"))));
    assert!(!signals_session_failure(401, &body(None, Some("EXPIRED"))));
}

#[test]
fn other_statuses_never_trigger() {
    assert!(!signals_session_failure(400, &body(Some("INVALID_TOKEN"), None)));
    assert!(!signals_session_failure(500, &body(None, Some("token expired"))));
}

#[test]
fn unmarked_401_does_not_trigger() {
    assert!(!signals_session_failure(401, &body(Some("VALIDATION_FAILED"), Some("title required"))));
    assert!(!signals_session_failure(403, &ApiErrorBody::default()));
}

// =============================================================================
// classify
// =============================================================================

#[test]
fn classify_forces_logout_for_marked_failure() {
    let auth = paths(DEFAULT_AUTH_PATHS);
    assert_eq!(
        classify("/tenants/42/blog", 403, &body(Some("AUTH_REQUIRED"), None), &auth),
        Interception::ForceLogout
    );
}

#[test]
fn classify_passes_login_failures_through() {
    let auth = paths(DEFAULT_AUTH_PATHS);
    assert_eq!(
        classify("/auth/login", 403, &body(Some("AUTH_REQUIRED"), None), &auth),
        Interception::PassThrough
    );
    assert_eq!(
        classify("/auth/signup", 401, &body(None, Some("Invalid credentials")), &auth),
        Interception::PassThrough
    );
}

#[test]
fn classify_passes_other_errors_through() {
    let auth = paths(DEFAULT_AUTH_PATHS);
    assert_eq!(classify("/tenants/42/blog", 422, &ApiErrorBody::default(), &auth), Interception::PassThrough);
    assert_eq!(classify("/tenants/42/blog", 500, &ApiErrorBody::default(), &auth), Interception::PassThrough);
}
