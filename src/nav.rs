//! Current location and navigation intents.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway and the guards never navigate themselves. They ask the
//! `Navigator` to emit a `NavigationIntent`, and whatever hosts them (a
//! browser shell, the CLI) subscribes and performs the actual navigation.

use std::sync::{PoisonError, RwLock};

use tokio::sync::broadcast;

use crate::config::{DEFAULT_ADMIN_PREFIX, DEFAULT_SUPERADMIN_LOGIN_ROUTE, DEFAULT_TENANT_LOGIN_ROUTE};

const INTENT_CHANNEL_CAPACITY: usize = 16;

/// The page the user is currently on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    /// Originating hostname; identifies the tenant site being served.
    pub hostname: String,
    pub path: String,
}

impl Location {
    #[must_use]
    pub fn new(hostname: impl Into<String>, path: impl Into<String>) -> Self {
        Self { hostname: hostname.into(), path: path.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginRoute {
    Superadmin,
    Tenant,
}

/// Login entry points and the prefix that marks superadmin pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRoutes {
    pub admin_prefix: String,
    pub superadmin_login: String,
    pub tenant_login: String,
}

impl Default for LoginRoutes {
    fn default() -> Self {
        Self {
            admin_prefix: DEFAULT_ADMIN_PREFIX.to_owned(),
            superadmin_login: DEFAULT_SUPERADMIN_LOGIN_ROUTE.to_owned(),
            tenant_login: DEFAULT_TENANT_LOGIN_ROUTE.to_owned(),
        }
    }
}

impl LoginRoutes {
    /// Pick the login entry point for a page path.
    #[must_use]
    pub fn route_for(&self, path: &str) -> LoginRoute {
        if path.starts_with(&self.admin_prefix) {
            LoginRoute::Superadmin
        } else {
            LoginRoute::Tenant
        }
    }

    #[must_use]
    pub fn target(&self, route: LoginRoute) -> &str {
        match route {
            LoginRoute::Superadmin => &self.superadmin_login,
            LoginRoute::Tenant => &self.tenant_login,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationReason {
    /// A guard found no token (or no tenant) before any network call.
    MissingCredentials,
    /// The backend rejected the session token.
    SessionRejected,
}

/// A request for the hosting shell to navigate to a login page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationIntent {
    pub route: LoginRoute,
    pub target: String,
    /// Replace the current history entry so back-navigation cannot return.
    pub replace: bool,
    pub reason: NavigationReason,
}

pub struct Navigator {
    routes: LoginRoutes,
    location: RwLock<Location>,
    intents: broadcast::Sender<NavigationIntent>,
}

impl Navigator {
    #[must_use]
    pub fn new(routes: LoginRoutes, location: Location) -> Self {
        let (intents, _) = broadcast::channel(INTENT_CHANNEL_CAPACITY);
        Self { routes, location: RwLock::new(location), intents }
    }

    #[must_use]
    pub fn routes(&self) -> &LoginRoutes {
        &self.routes
    }

    #[must_use]
    pub fn location(&self) -> Location {
        self.location.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn set_location(&self, location: Location) {
        *self.location.write().unwrap_or_else(PoisonError::into_inner) = location;
    }

    /// Login route matching the current page.
    #[must_use]
    pub fn current_login_route(&self) -> LoginRoute {
        self.routes.route_for(&self.location().path)
    }

    /// Emit a navigation intent towards `route`'s login page.
    pub fn redirect_to_login(&self, route: LoginRoute, replace: bool, reason: NavigationReason) -> NavigationIntent {
        let intent = NavigationIntent { route, target: self.routes.target(route).to_owned(), replace, reason };
        tracing::info!(login_target = %intent.target, ?reason, replace, "redirecting to login");
        // No subscribers just means no shell is listening yet.
        let _ = self.intents.send(intent.clone());
        intent
    }

    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<NavigationIntent> {
        self.intents.subscribe()
    }
}

#[cfg(test)]
#[path = "nav_test.rs"]
mod nav_test;
