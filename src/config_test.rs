use super::*;
use std::sync::Mutex;

static ENV_LOCK: Mutex<()> = Mutex::new(());

const VARS: &[&str] = &[
    "SITEDESK_API_BASE_URL",
    "SITEDESK_REQUEST_TIMEOUT_SECS",
    "SITEDESK_CONNECT_TIMEOUT_SECS",
    "SITEDESK_PUBLIC_PATHS",
    "SITEDESK_AUTH_PATHS",
    "SITEDESK_ADMIN_PREFIX",
    "SITEDESK_SUPERADMIN_LOGIN_ROUTE",
    "SITEDESK_TENANT_LOGIN_ROUTE",
];

/// # Safety
/// Callers hold `ENV_LOCK` so no other test in this module touches the env.
unsafe fn clear_sitedesk_env() {
    for var in VARS {
        unsafe { std::env::remove_var(var) };
    }
}

#[test]
fn from_env_uses_defaults() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe { clear_sitedesk_env() };

    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg, GatewayConfig::default());
    assert_eq!(cfg.base_url, DEFAULT_API_BASE_URL);
    assert_eq!(cfg.timeouts.request(), Duration::from_secs(30));
    assert_eq!(cfg.routes.superadmin_login, "/admin/login");
    assert_eq!(cfg.routes.tenant_login, "/backoffice/login");
}

#[test]
fn from_env_parses_overrides() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sitedesk_env();
        std::env::set_var("SITEDESK_API_BASE_URL", "https://cms.example.test/api/");
        std::env::set_var("SITEDESK_REQUEST_TIMEOUT_SECS", "5");
        std::env::set_var("SITEDESK_CONNECT_TIMEOUT_SECS", "2");
        std::env::set_var("SITEDESK_PUBLIC_PATHS", "/auth/login, /health/");
        std::env::set_var("SITEDESK_TENANT_LOGIN_ROUTE", "/login");
    }

    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg.base_url, "https://cms.example.test/api");
    assert_eq!(cfg.timeouts, Timeouts { request_secs: 5, connect_secs: 2 });
    assert_eq!(cfg.public_paths, vec!["/auth/login".to_owned(), "/health".to_owned()]);
    assert_eq!(cfg.auth_paths, owned(DEFAULT_AUTH_PATHS));
    assert_eq!(cfg.routes.tenant_login, "/login");

    unsafe { clear_sitedesk_env() };
}

#[test]
fn from_env_bad_timeout_falls_back_to_default() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sitedesk_env();
        std::env::set_var("SITEDESK_REQUEST_TIMEOUT_SECS", "soon");
    }

    let cfg = GatewayConfig::from_env().unwrap();
    assert_eq!(cfg.timeouts.request_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

    unsafe { clear_sitedesk_env() };
}

#[test]
fn from_env_rejects_non_http_base_url() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sitedesk_env();
        std::env::set_var("SITEDESK_API_BASE_URL", "ftp://cms.example.test");
    }

    let err = GatewayConfig::from_env().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidBaseUrl(_)));

    unsafe { clear_sitedesk_env() };
}

#[test]
fn from_env_rejects_relative_route() {
    let _guard = ENV_LOCK.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
    unsafe {
        clear_sitedesk_env();
        std::env::set_var("SITEDESK_ADMIN_PREFIX", "admin");
    }

    let err = GatewayConfig::from_env().unwrap_err().to_string();
    assert!(err.contains("SITEDESK_ADMIN_PREFIX must start with '/'"));

    unsafe { clear_sitedesk_env() };
}

#[test]
fn parse_path_list_rejects_relative_entries() {
    let err = parse_path_list("KEY", "/auth/login,auth/signup").unwrap_err().to_string();
    assert!(err.contains("entry must start with '/'"));
}

#[test]
fn parse_path_list_rejects_empty_list() {
    assert!(parse_path_list("KEY", " , ").is_err());
}

#[test]
fn parse_path_list_keeps_root() {
    assert_eq!(parse_path_list("KEY", "/").unwrap(), vec!["/".to_owned()]);
}
