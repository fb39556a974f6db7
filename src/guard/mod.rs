//! Route guards for the two protected areas of the backoffice.
//!
//! SYSTEM CONTEXT
//! ==============
//! The superadmin area only checks that a token is present; the backend
//! enforces the role on each call. The tenant area validates the session
//! against the backend on every mount before rendering its children.

pub mod state;
pub mod superadmin;
pub mod tenant;

pub use state::{AdminGuardState, GuardState, GuardView};
pub use superadmin::SuperadminGuard;
pub use tenant::{GuardFailure, TenantGuard};
