//! Gateway configuration parsed from environment variables.

use std::time::Duration;

use crate::nav::LoginRoutes;
use crate::net::interceptor::normalize_path;

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Backend paths reachable without a bearer token.
pub const DEFAULT_PUBLIC_PATHS: &[&str] = &[
    "/auth/login",
    "/auth/signup",
    "/auth/forgot-password",
    "/auth/reset-password",
    "/superadmin/auth/login",
];

/// Login/signup endpoints whose auth failures belong to the calling form.
pub const DEFAULT_AUTH_PATHS: &[&str] = &["/auth/login", "/auth/signup", "/superadmin/auth/login"];

pub const DEFAULT_ADMIN_PREFIX: &str = "/admin";
pub const DEFAULT_SUPERADMIN_LOGIN_ROUTE: &str = "/admin/login";
pub const DEFAULT_TENANT_LOGIN_ROUTE: &str = "/backoffice/login";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    ConfigParse(String),

    /// The backend base URL is not an http(s) URL.
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Timeouts {
    #[must_use]
    pub fn request(&self) -> Duration {
        Duration::from_secs(self.request_secs)
    }

    #[must_use]
    pub fn connect(&self) -> Duration {
        Duration::from_secs(self.connect_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub base_url: String,
    pub timeouts: Timeouts,
    pub public_paths: Vec<String>,
    pub auth_paths: Vec<String>,
    pub routes: LoginRoutes,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE_URL.to_owned(),
            timeouts: Timeouts {
                request_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
                connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            },
            public_paths: owned(DEFAULT_PUBLIC_PATHS),
            auth_paths: owned(DEFAULT_AUTH_PATHS),
            routes: LoginRoutes::default(),
        }
    }
}

impl GatewayConfig {
    /// Build typed gateway config from environment variables.
    ///
    /// Optional:
    /// - `SITEDESK_API_BASE_URL`: default `http://127.0.0.1:3000/api`
    /// - `SITEDESK_REQUEST_TIMEOUT_SECS`: default 30
    /// - `SITEDESK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `SITEDESK_PUBLIC_PATHS`: comma list replacing the public allowlist
    /// - `SITEDESK_AUTH_PATHS`: comma list replacing the login/signup set
    /// - `SITEDESK_ADMIN_PREFIX`: default `/admin`
    /// - `SITEDESK_SUPERADMIN_LOGIN_ROUTE`: default `/admin/login`
    /// - `SITEDESK_TENANT_LOGIN_ROUTE`: default `/backoffice/login`
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is not http(s) or a path value does
    /// not start with `/`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = parse_base_url(
            &std::env::var("SITEDESK_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_owned()),
        )?;
        let timeouts = Timeouts {
            request_secs: env_parse_u64("SITEDESK_REQUEST_TIMEOUT_SECS", DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: env_parse_u64("SITEDESK_CONNECT_TIMEOUT_SECS", DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let public_paths = match std::env::var("SITEDESK_PUBLIC_PATHS") {
            Ok(raw) => parse_path_list("SITEDESK_PUBLIC_PATHS", &raw)?,
            Err(_) => owned(DEFAULT_PUBLIC_PATHS),
        };
        let auth_paths = match std::env::var("SITEDESK_AUTH_PATHS") {
            Ok(raw) => parse_path_list("SITEDESK_AUTH_PATHS", &raw)?,
            Err(_) => owned(DEFAULT_AUTH_PATHS),
        };
        let routes = LoginRoutes {
            admin_prefix: env_route("SITEDESK_ADMIN_PREFIX", DEFAULT_ADMIN_PREFIX)?,
            superadmin_login: env_route("SITEDESK_SUPERADMIN_LOGIN_ROUTE", DEFAULT_SUPERADMIN_LOGIN_ROUTE)?,
            tenant_login: env_route("SITEDESK_TENANT_LOGIN_ROUTE", DEFAULT_TENANT_LOGIN_ROUTE)?,
        };

        Ok(Self { base_url, timeouts, public_paths, auth_paths, routes })
    }
}

fn owned(paths: &[&str]) -> Vec<String> {
    paths.iter().map(|p| (*p).to_owned()).collect()
}

fn env_parse_u64(key: &str, default: u64) -> u64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_route(key: &str, default: &str) -> Result<String, ConfigError> {
    let raw = std::env::var(key).unwrap_or_else(|_| default.to_owned());
    let trimmed = raw.trim();
    if !trimmed.starts_with('/') {
        return Err(ConfigError::ConfigParse(format!("{key} must start with '/': {trimmed}")));
    }
    Ok(trimmed.to_owned())
}

pub(crate) fn parse_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        return Ok(trimmed.to_owned());
    }
    Err(ConfigError::InvalidBaseUrl(raw.to_owned()))
}

pub(crate) fn parse_path_list(key: &str, raw: &str) -> Result<Vec<String>, ConfigError> {
    let mut paths = Vec::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        if !entry.starts_with('/') {
            return Err(ConfigError::ConfigParse(format!("{key} entry must start with '/': {entry}")));
        }
        paths.push(normalize_path(entry).to_owned());
    }
    if paths.is_empty() {
        return Err(ConfigError::ConfigParse(format!("{key} is empty")));
    }
    Ok(paths)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
