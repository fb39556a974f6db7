use super::*;

fn navigator(path: &str) -> Navigator {
    Navigator::new(LoginRoutes::default(), Location::new("acme.example.test", path))
}

#[test]
fn admin_prefixed_path_routes_to_superadmin_login() {
    let routes = LoginRoutes::default();
    assert_eq!(routes.route_for("/admin"), LoginRoute::Superadmin);
    assert_eq!(routes.route_for("/admin/tenants/7"), LoginRoute::Superadmin);
}

#[test]
fn other_paths_route_to_tenant_login() {
    let routes = LoginRoutes::default();
    assert_eq!(routes.route_for("/"), LoginRoute::Tenant);
    assert_eq!(routes.route_for("/backoffice/blog"), LoginRoute::Tenant);
    assert_eq!(routes.route_for("/dashboard/admin"), LoginRoute::Tenant);
}

#[test]
fn target_maps_route_to_login_path() {
    let routes = LoginRoutes::default();
    assert_eq!(routes.target(LoginRoute::Superadmin), "/admin/login");
    assert_eq!(routes.target(LoginRoute::Tenant), "/backoffice/login");
}

#[test]
fn current_login_route_follows_location() {
    let nav = navigator("/backoffice/home");
    assert_eq!(nav.current_login_route(), LoginRoute::Tenant);

    nav.set_location(Location::new("acme.example.test", "/admin/users"));
    assert_eq!(nav.current_login_route(), LoginRoute::Superadmin);
}

#[test]
fn redirect_emits_intent_to_subscribers() {
    let nav = navigator("/backoffice/home");
    let mut rx = nav.subscribe();

    let sent = nav.redirect_to_login(LoginRoute::Tenant, true, NavigationReason::SessionRejected);
    let received = rx.try_recv().unwrap();

    assert_eq!(sent, received);
    assert_eq!(received.target, "/backoffice/login");
    assert!(received.replace);
    assert_eq!(received.reason, NavigationReason::SessionRejected);
}

#[test]
fn redirect_without_subscribers_does_not_panic() {
    let nav = navigator("/admin");
    let intent = nav.redirect_to_login(LoginRoute::Superadmin, true, NavigationReason::MissingCredentials);
    assert_eq!(intent.target, "/admin/login");
}
