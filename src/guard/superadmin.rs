//! Superadmin area guard.
//!
//! TRADE-OFFS
//! ==========
//! Mounting only checks that a token sits in durable storage. No backend call
//! is made, so a revoked or non-superadmin token still renders the area until
//! the first API call comes back rejected and the gateway logs out.

use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;

use super::state::{AdminGuardState, GuardView, admin_transition};
use crate::nav::{LoginRoute, NavigationReason, Navigator};
use crate::session::SessionStore;

pub struct SuperadminGuard {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
    state: watch::Sender<AdminGuardState>,
}

impl SuperadminGuard {
    /// An unmounted guard reports `Absent`, which renders as loading.
    #[must_use]
    pub fn new(session: Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        let (state, _) = watch::channel(AdminGuardState::Absent);
        Self { session, navigator, state }
    }

    /// Check the persisted token and redirect to the superadmin login if it is
    /// missing.
    pub fn mount(&self) -> AdminGuardState {
        let next = admin_transition(self.session.persisted_token().is_some());
        if next == AdminGuardState::Absent {
            tracing::info!("superadmin token missing; redirecting to login");
            self.session.clear_session();
            self.navigator
                .redirect_to_login(LoginRoute::Superadmin, true, NavigationReason::MissingCredentials);
        }
        self.state.send_replace(next);
        next
    }

    /// Re-mount whenever the session token changes.
    ///
    /// The task holds the guard; abort the handle when the area unmounts.
    #[must_use]
    pub fn watch_session(self: Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.session.subscribe();
        let mut last = changes.borrow_and_update().token.clone();
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let token = changes.borrow_and_update().token.clone();
                if token == last {
                    continue;
                }
                last = token;
                self.mount();
            }
        })
    }

    #[must_use]
    pub fn state(&self) -> AdminGuardState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn view(&self) -> GuardView {
        self.state().view()
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AdminGuardState> {
        self.state.subscribe()
    }
}

#[cfg(test)]
#[path = "superadmin_test.rs"]
mod superadmin_test;
