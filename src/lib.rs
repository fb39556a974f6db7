//! Session core for the sitedesk multi-tenant CMS frontend.
//!
//! ARCHITECTURE
//! ============
//! Leaves first: `session` holds the token/tenant/user triple and its
//! persisted copy, `nav` carries the current location and navigation intents,
//! `net` is the single outbound gateway to the backend, and `guard` decides
//! whether protected content may render. Everything is wired by explicit
//! `Arc` injection; there is no process-global state.

pub mod config;
pub mod guard;
pub mod nav;
pub mod net;
pub mod session;
