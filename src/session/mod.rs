//! Session state: the token/tenant/user triple and its durable copy.
//!
//! SYSTEM CONTEXT
//! ==============
//! `SessionStore` is the single authoritative holder of the session. The
//! gateway reads the token from it and clears it on auth failure; guards read
//! it before rendering and refresh the user after revalidation.

pub mod storage;
pub mod store;

use serde::{Deserialize, Serialize};

pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageChange, StorageError};
pub use store::SessionStore;

/// Current authenticated actor. All fields absent means logged out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub token: Option<String>,
    pub tenant_id: Option<String>,
    /// Last-fetched profile snapshot. Only meaningful while `token` is set.
    pub user: Option<serde_json::Value>,
}

impl Session {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.tenant_id.is_none() && self.user.is_none()
    }

    /// Token and tenant both present, as tenant-scoped routes require.
    #[must_use]
    pub fn has_tenant_credentials(&self) -> bool {
        self.token.is_some() && self.tenant_id.is_some()
    }
}
