use super::*;
use std::sync::Arc;

use crate::config::CachePolicy;
use crate::state::storage::MemoryStore;

fn session() -> Session {
    Session::restore(Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()), CachePolicy::Clear).unwrap()
}

#[test]
fn starts_at_home() {
    let router = Router::new(session());
    assert_eq!(router.current(), Location::new(HOME_PATH));
    assert_eq!(router.entries().len(), 1);
}

#[test]
fn logged_out_protected_navigation_lands_on_login() {
    let router = Router::new(session());

    let nav = router.navigate("/smart-match?mode=expert").unwrap();

    assert!(nav.redirected);
    assert_eq!(nav.route.name, "Login");
    assert_eq!(nav.location.query("redirect"), Some("/smart-match?mode=expert"));
    assert_eq!(router.current(), nav.location);
}

#[test]
fn logged_in_navigation_is_allowed_with_params() {
    let session = session();
    session.set_credential("jwt").unwrap();
    let router = Router::new(session);

    let nav = router.navigate("/requirement/12").unwrap();

    assert!(!nav.redirected);
    assert_eq!(nav.route.name, "RequirementDetail");
    assert_eq!(nav.params, vec![("id", "12".to_owned())]);
}

#[test]
fn login_detour_then_return() {
    let session = session();
    let router = Router::new(session.clone());

    let detour = router.navigate("/search?q=llm").unwrap();
    assert_eq!(detour.location.path(), "/login");

    session.set_credential("jwt").unwrap();
    let back = router.navigate_to(detour.location).unwrap();

    assert!(back.redirected);
    assert_eq!(back.location.href(), "/search?q=llm");
    assert_eq!(back.route.name, "Search");
}

#[test]
fn logged_in_login_visit_without_target_goes_home() {
    let session = session();
    session.set_credential("jwt").unwrap();
    let router = Router::new(session);

    let nav = router.navigate("/login").unwrap();
    assert_eq!(nav.location, Location::new(HOME_PATH));
    assert_eq!(nav.route.name, "Home");
}

#[test]
fn unknown_route_is_an_error_and_keeps_current() {
    let router = Router::new(session());
    assert_eq!(router.navigate("/missing"), Err(RouterError::NoMatch("/missing".into())));
    assert!(matches!(router.navigate("no-slash"), Err(RouterError::InvalidLocation(_))));
    assert_eq!(router.current(), Location::new(HOME_PATH));
}

#[test]
fn guard_reads_session_flag_at_navigation_time() {
    let session = session();
    let router = Router::new(session.clone());

    session.set_credential("jwt").unwrap();
    assert!(!router.navigate("/ai-chat").unwrap().redirected);

    session.logout();
    assert!(router.navigate("/ai-chat").unwrap().redirected);
}

#[test]
fn logged_in_login_visit_with_unknown_target_goes_home() {
    let session = session();
    session.set_credential("jwt").unwrap();
    let router = Router::new(session);

    let nav = router.navigate("/login?redirect=%2Fno-such-view").unwrap();

    assert!(nav.redirected);
    assert_eq!(nav.location, Location::new(HOME_PATH));
    assert_eq!(nav.route.name, "Home");
}

#[test]
fn current_route_ignores_trailing_slash() {
    let router = Router::new(session());
    router.navigate("/login/").unwrap();
    assert_eq!(router.current_route().map(|r| r.name), Some("Login"));
}

#[test]
fn history_keeps_only_the_most_recent_entries() {
    let session = session();
    session.set_credential("jwt").unwrap();
    let router = Router::new(session);

    for id in 0..MAX_HISTORY * 2 {
        router.navigate(&format!("/proposal/{id}")).unwrap();
    }

    let entries = router.entries();
    assert_eq!(entries.len(), MAX_HISTORY);
    assert_eq!(entries.last(), Some(&router.current()));
    assert_eq!(router.current().path(), format!("/proposal/{}", MAX_HISTORY * 2 - 1));
}
