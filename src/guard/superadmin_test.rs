use super::*;
use crate::nav::{Location, LoginRoutes};
use crate::session::{MemoryStorage, SessionStorage, StorageChange};
use crate::session::store::TOKEN_KEY;
use serde_json::json;
use std::time::Duration;

fn guard_at(path: &str) -> (MemoryStorage, Arc<SessionStore>, Arc<Navigator>, Arc<SuperadminGuard>) {
    let storage = MemoryStorage::new();
    let session = Arc::new(SessionStore::rehydrate(Arc::new(storage.clone())));
    let navigator = Arc::new(Navigator::new(LoginRoutes::default(), Location::new("admin.example.test", path)));
    let guard = Arc::new(SuperadminGuard::new(Arc::clone(&session), Arc::clone(&navigator)));
    (storage, session, navigator, guard)
}

#[test]
fn unmounted_guard_shows_loading() {
    let (_, _, _, guard) = guard_at("/admin/tenants");
    assert_eq!(guard.view(), GuardView::Loading);
}

#[test]
fn missing_token_clears_and_replaces_with_superadmin_login() {
    let (storage, _session, navigator, guard) = guard_at("/admin/tenants");
    let mut intents = navigator.subscribe();

    assert_eq!(guard.mount(), AdminGuardState::Absent);

    assert_eq!(guard.view(), GuardView::Loading);
    assert!(storage.is_empty());
    let intent = intents.try_recv().unwrap();
    assert_eq!(intent.route, LoginRoute::Superadmin);
    assert_eq!(intent.target, "/admin/login");
    assert!(intent.replace);
    assert_eq!(intent.reason, NavigationReason::MissingCredentials);
}

#[test]
fn present_token_renders_children_without_redirect() {
    let (_, session, navigator, guard) = guard_at("/admin/tenants");
    session.set_credentials("root".into(), None, Some(json!({ "role": "superadmin" })));
    let mut intents = navigator.subscribe();

    assert_eq!(guard.mount(), AdminGuardState::Present);

    assert_eq!(guard.view(), GuardView::Children);
    assert!(intents.try_recv().is_err());
    assert_eq!(session.select_token().as_deref(), Some("root"));
}

#[test]
fn tenant_token_also_passes_presence_check() {
    let (_, session, _, guard) = guard_at("/admin");
    session.set_credentials("tenant-token".into(), Some("42".into()), None);

    assert_eq!(guard.mount(), AdminGuardState::Present);
}

#[test]
fn durable_copy_decides_not_memory() {
    let (storage, session, _, guard) = guard_at("/admin/tenants");
    session.set_credentials("root".into(), None, None);
    storage.apply(&[StorageChange::Remove(TOKEN_KEY.to_owned())]).unwrap();

    assert_eq!(guard.mount(), AdminGuardState::Absent);
    assert!(session.select_token().is_none());
}

#[tokio::test]
async fn watch_session_remounts_when_token_is_cleared() {
    let (_, session, navigator, guard) = guard_at("/admin/tenants");
    session.set_credentials("root".into(), None, None);
    guard.mount();
    let mut states = guard.subscribe();
    let mut intents = navigator.subscribe();
    let handle = Arc::clone(&guard).watch_session();
    tokio::task::yield_now().await;

    session.clear_session();

    tokio::time::timeout(Duration::from_secs(1), states.changed())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(guard.state(), AdminGuardState::Absent);
    assert_eq!(intents.recv().await.unwrap().target, "/admin/login");
    handle.abort();
}
