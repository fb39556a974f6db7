//! Session store with a persisted mirror.
//!
//! DESIGN
//! ======
//! The in-memory `Session` is the source of truth for the process lifetime;
//! the storage copy exists to survive reloads. Every mutation holds the write
//! lock across the storage batch and the in-memory swap, so no reader that
//! goes through the store observes one copy ahead of the other.
//!
//! ERROR HANDLING
//! ==============
//! A failed credential write is logged and the in-memory copy is still
//! updated; the next reload simply will not see the login.
//!
//! A failed clear is not allowed to leave a usable token behind. The keys
//! are retried one at a time, and if any survive the store remembers that
//! the persisted copy is logged out, so `persisted_token` reports nothing
//! until a later write succeeds. `clear_session` returns `false` in that case.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::Value;
use tokio::sync::watch;

use super::Session;
use super::storage::{SessionStorage, StorageChange};

pub const TOKEN_KEY: &str = "sitedesk.token";
pub const TENANT_KEY: &str = "sitedesk.tenant_id";
pub const USER_KEY: &str = "sitedesk.user";

const SESSION_KEYS: [&str; 3] = [TOKEN_KEY, TENANT_KEY, USER_KEY];

struct Slot {
    session: Session,
    /// Storage still holds keys a clear could not remove.
    stale_persisted: bool,
}

pub struct SessionStore {
    storage: Arc<dyn SessionStorage>,
    current: RwLock<Slot>,
    changes: watch::Sender<Session>,
}

impl SessionStore {
    /// Build a store from whatever the storage currently holds.
    #[must_use]
    pub fn rehydrate(storage: Arc<dyn SessionStorage>) -> Self {
        let session = read_persisted(storage.as_ref());
        tracing::debug!(
            has_token = session.token.is_some(),
            tenant_id = ?session.tenant_id,
            "session rehydrated"
        );
        let (changes, _) = watch::channel(session.clone());
        Self { storage, current: RwLock::new(Slot { session, stale_persisted: false }), changes }
    }

    /// Overwrite all three session fields (login success).
    ///
    /// Empty strings count as absent, the same as on rehydrate.
    pub fn set_credentials(&self, token: String, tenant_id: Option<String>, user: Option<Value>) {
        let token = non_empty(Some(token));
        let tenant_id = non_empty(tenant_id);
        let user = if token.is_some() { user } else { None };

        let changes = [
            string_change(TOKEN_KEY, token.as_deref()),
            string_change(TENANT_KEY, tenant_id.as_deref()),
            user_change(user.as_ref()),
        ];

        tracing::info!(tenant_id = ?tenant_id, "session credentials stored");
        let mut slot = self.write();
        match self.storage.apply(&changes) {
            Ok(()) => slot.stale_persisted = false,
            Err(e) => tracing::warn!(error = %e, "failed to persist session credentials"),
        }
        slot.session = Session { token, tenant_id, user };
        self.publish(slot);
    }

    /// Replace the cached user after a successful revalidation.
    ///
    /// Applies only while the session still carries `expected_token` and
    /// `expected_tenant`; returns `false` when the identity moved on.
    pub fn refresh_user(&self, expected_token: &str, expected_tenant: &str, user: Value) -> bool {
        let mut slot = self.write();
        if !holds(&slot.session, expected_token, expected_tenant) {
            tracing::debug!("session identity changed; skipping user refresh");
            return false;
        }

        if let Err(e) = self.storage.apply(&[user_change(Some(&user))]) {
            tracing::warn!(error = %e, "failed to persist refreshed user");
        }
        slot.session.user = Some(user);
        self.publish(slot);
        true
    }

    /// Set all fields to absent and remove the persisted keys entirely.
    ///
    /// Returns `false` if storage kept any of the keys; the store then
    /// treats the persisted token as gone.
    pub fn clear_session(&self) -> bool {
        let slot = self.write();
        self.clear_locked(slot)
    }

    /// Clear the session only if it still belongs to `expected_token` and
    /// `expected_tenant`.
    ///
    /// Returns `false` only when a different identity has replaced the
    /// expected one. A session that is already empty counts as cleared.
    pub fn clear_if(&self, expected_token: &str, expected_tenant: &str) -> bool {
        let slot = self.write();
        if slot.session.token.is_none() && slot.session.tenant_id.is_none() {
            return true;
        }
        if !holds(&slot.session, expected_token, expected_tenant) {
            tracing::debug!("session identity changed; skipping clear");
            return false;
        }
        self.clear_locked(slot);
        true
    }

    #[must_use]
    pub fn select_token(&self) -> Option<String> {
        self.read().session.token.clone()
    }

    #[must_use]
    pub fn select_tenant_id(&self) -> Option<String> {
        self.read().session.tenant_id.clone()
    }

    /// The cached user, which is only valid while a token is present.
    #[must_use]
    pub fn select_user(&self) -> Option<Value> {
        let slot = self.read();
        slot.session.token.as_ref()?;
        slot.session.user.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.read().session.clone()
    }

    /// Read the token from durable storage rather than the in-memory copy.
    #[must_use]
    pub fn persisted_token(&self) -> Option<String> {
        let slot = self.read();
        if slot.stale_persisted {
            return None;
        }
        non_empty(self.storage.get(TOKEN_KEY))
    }

    /// Receive the session after every mutation.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.changes.subscribe()
    }

    fn read(&self) -> RwLockReadGuard<'_, Slot> {
        self.current.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Slot> {
        self.current.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn clear_locked(&self, mut slot: RwLockWriteGuard<'_, Slot>) -> bool {
        let batch = SESSION_KEYS.map(|key| StorageChange::Remove(key.to_owned()));
        let persisted = match self.storage.apply(&batch) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "failed to clear persisted session; retrying per key");
                let mut all_removed = true;
                for change in &batch {
                    if let Err(e) = self.storage.apply(std::slice::from_ref(change)) {
                        tracing::warn!(?change, error = %e, "persisted session key not removed");
                        all_removed = false;
                    }
                }
                all_removed
            }
        };

        tracing::info!(persisted, "session cleared");
        slot.stale_persisted = !persisted;
        slot.session = Session::default();
        self.publish(slot);
        persisted
    }

    fn publish(&self, slot: RwLockWriteGuard<'_, Slot>) {
        let snapshot = slot.session.clone();
        drop(slot);
        self.changes.send_replace(snapshot);
    }
}

fn holds(session: &Session, token: &str, tenant: &str) -> bool {
    session.token.as_deref() == Some(token) && session.tenant_id.as_deref() == Some(tenant)
}

fn string_change(key: &str, value: Option<&str>) -> StorageChange {
    match value {
        Some(value) => StorageChange::Set(key.to_owned(), value.to_owned()),
        None => StorageChange::Remove(key.to_owned()),
    }
}

fn user_change(user: Option<&Value>) -> StorageChange {
    match user {
        Some(user) => StorageChange::Set(USER_KEY.to_owned(), user.to_string()),
        None => StorageChange::Remove(USER_KEY.to_owned()),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn read_persisted(storage: &dyn SessionStorage) -> Session {
    let token = non_empty(storage.get(TOKEN_KEY));
    let tenant_id = non_empty(storage.get(TENANT_KEY));
    let user = if token.is_some() {
        storage
            .get(USER_KEY)
            .and_then(|raw| serde_json::from_str::<Value>(&raw).ok())
    } else {
        None
    };
    Session { token, tenant_id, user }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;
