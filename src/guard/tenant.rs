//! Tenant area guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every mount re-validates the stored token and tenant id by fetching the
//! tenant profile through the gateway. The fetched profile becomes the
//! session's cached user.
//!
//! DESIGN
//! ======
//! Each mount takes a generation number. A validation whose generation is no
//! longer current when its response arrives is dropped, so a slow response
//! for an old identity never overwrites the state of a newer mount. Both the
//! user refresh and the clear on failure are also checked against the
//! identity the mount started with, which covers the window before the
//! replacement mount has begun.
//!
//! ERROR HANDLING
//! ==============
//! A failed validation clears the session and renders blank without issuing
//! its own redirect. Auth failures are already redirected by the gateway;
//! anything else is recorded as a [`GuardFailure`] for the shell to surface.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::{GuardState, GuardView, tenant_transition};
use crate::nav::{LoginRoute, NavigationReason};
use crate::net::api;
use crate::net::{ApiGateway, GatewayError};
use crate::session::Session;

/// Why the last validation ended unauthenticated.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardFailure {
    /// The backend rejected the session.
    SessionRejected { status: u16 },
    /// Anything not about the session: network, server errors, bad bodies.
    Transient { message: String },
}

impl GuardFailure {
    fn from_error(error: &GatewayError) -> Self {
        match error {
            GatewayError::SessionRejected { status, .. } => Self::SessionRejected { status: *status },
            other => Self::Transient { message: other.to_string() },
        }
    }

    /// Whether retrying the mount could succeed without logging in again.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transient { .. })
    }
}

pub struct TenantGuard {
    gateway: Arc<ApiGateway>,
    state: watch::Sender<GuardState>,
    generation: AtomicU64,
    failure: Mutex<Option<GuardFailure>>,
}

impl TenantGuard {
    #[must_use]
    pub fn new(gateway: Arc<ApiGateway>) -> Self {
        let (state, _) = watch::channel(GuardState::Validating);
        Self { gateway, state, generation: AtomicU64::new(0), failure: Mutex::new(None) }
    }

    /// Validate the current session and settle the guard state.
    ///
    /// Returns the state this mount settled on, or the current state if the
    /// mount was superseded while its fetch was in flight.
    pub async fn mount(&self) -> GuardState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let session = self.gateway.session();
        self.set_failure(None);

        let (Some(token), Some(tenant_id)) = (session.select_token(), session.select_tenant_id()) else {
            tracing::info!(generation, "tenant credentials missing; redirecting to login");
            let next = tenant_transition(false, None);
            self.state.send_replace(next);
            session.clear_session();
            self.gateway
                .navigator()
                .redirect_to_login(LoginRoute::Tenant, true, NavigationReason::MissingCredentials);
            return next;
        };

        self.state.send_replace(tenant_transition(true, None));
        tracing::debug!(generation, %tenant_id, "validating tenant session");
        let result = api::fetch_tenant_profile(&self.gateway, &tenant_id).await;

        if !self.is_current(generation) {
            tracing::debug!(generation, %tenant_id, "discarding stale tenant validation");
            return self.state();
        }

        match result {
            Ok(profile) => {
                if !session.refresh_user(&token, &tenant_id, profile) {
                    tracing::debug!(generation, "session changed during validation; discarding");
                    return self.state();
                }
                let next = tenant_transition(true, Some(Ok(())));
                tracing::info!(generation, %tenant_id, "tenant session validated");
                self.state.send_replace(next);
                next
            }
            Err(e) => {
                // Unauthenticated goes out before the clear so the watcher
                // does not treat the clear as an external logout.
                let next = tenant_transition(true, Some(Err(())));
                self.state.send_replace(next);
                if !session.clear_if(&token, &tenant_id) {
                    tracing::debug!(generation, error = %e, "session changed during failed validation; discarding");
                    self.state.send_replace(tenant_transition(true, None));
                    return self.state();
                }
                tracing::warn!(generation, %tenant_id, error = %e, "tenant validation failed");
                self.set_failure(Some(GuardFailure::from_error(&e)));
                next
            }
        }
    }

    /// Re-mount on every token or tenant change.
    ///
    /// A change to "no credentials" while already unauthenticated is skipped;
    /// that is the guard's own clear after a failed validation. The task holds
    /// the guard; abort the handle when the area unmounts.
    #[must_use]
    pub fn watch_session(self: Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.gateway.session().subscribe();
        let mut last = identity(&changes.borrow_and_update());
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let (current, present) = {
                    let session = changes.borrow_and_update();
                    (identity(&session), session.has_tenant_credentials())
                };
                if current == last {
                    continue;
                }
                last = current;

                if !present && self.state() == GuardState::Unauthenticated {
                    continue;
                }
                let guard = Arc::clone(&self);
                tokio::spawn(async move {
                    guard.mount().await;
                });
            }
        })
    }

    #[must_use]
    pub fn state(&self) -> GuardState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn view(&self) -> GuardView {
        self.state().view()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<GuardState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn last_failure(&self) -> Option<GuardFailure> {
        self.failure.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn set_failure(&self, failure: Option<GuardFailure>) {
        *self.failure.lock().unwrap_or_else(PoisonError::into_inner) = failure;
    }
}

fn identity(session: &Session) -> (Option<String>, Option<String>) {
    (session.token.clone(), session.tenant_id.clone())
}

#[cfg(test)]
#[path = "tenant_test.rs"]
mod tenant_test;
