use super::*;
use crate::state::storage::MemoryStore;
use crate::state::test_helpers::{dummy_profile, seed_derived_caches};

fn stores() -> (Arc<MemoryStore>, Arc<MemoryStore>) {
    (Arc::new(MemoryStore::new()), Arc::new(MemoryStore::new()))
}

fn session_with(policy: CachePolicy) -> (Session, Arc<MemoryStore>, Arc<MemoryStore>) {
    let (local, scoped) = stores();
    let session = Session::restore(local.clone(), scoped.clone(), policy).unwrap();
    (session, local, scoped)
}

// =============================================================
// restore
// =============================================================

#[test]
fn restore_empty_store_is_logged_out() {
    let (session, _, _) = session_with(CachePolicy::Clear);
    assert!(!session.is_logged_in());
    assert!(session.credential().is_none());
    assert!(session.profile().is_none());
}

#[test]
fn restore_picks_up_persisted_credential_and_profile() {
    let (local, scoped) = stores();
    local.set(TOKEN_KEY, "jwt-1").unwrap();
    storage::save_json(&*local, USER_INFO_KEY, &dummy_profile("alice")).unwrap();

    let session = Session::restore(local, scoped, CachePolicy::Clear).unwrap();
    assert!(session.is_logged_in());
    assert_eq!(session.credential().as_deref(), Some("jwt-1"));
    assert_eq!(session.profile().unwrap().username, "alice");
}

#[test]
fn restore_ignores_profile_without_credential() {
    let (local, scoped) = stores();
    storage::save_json(&*local, USER_INFO_KEY, &dummy_profile("ghost")).unwrap();

    let session = Session::restore(local, scoped, CachePolicy::Clear).unwrap();
    assert!(!session.is_logged_in());
    assert!(session.profile().is_none());
}

#[test]
fn restore_treats_empty_token_as_logged_out() {
    let (local, scoped) = stores();
    local.set(TOKEN_KEY, "").unwrap();
    let session = Session::restore(local, scoped, CachePolicy::Clear).unwrap();
    assert!(!session.is_logged_in());
}

// =============================================================
// credential lifecycle
// =============================================================

#[test]
fn set_credential_then_logout_round_trip() {
    let (session, local, _) = session_with(CachePolicy::Clear);

    session.set_credential("jwt-2").unwrap();
    assert!(session.is_logged_in());
    assert_eq!(local.get(TOKEN_KEY).unwrap().as_deref(), Some("jwt-2"));

    session.logout();
    assert!(!session.is_logged_in());
    assert_eq!(local.get(TOKEN_KEY).unwrap(), None);
}

#[test]
fn identity_changes_on_every_credential_change() {
    let (session, _, _) = session_with(CachePolicy::Clear);
    let initial = session.identity();

    let issued = session.set_credential("a").unwrap();
    assert_ne!(issued, initial);
    assert_eq!(session.identity(), issued);

    session.logout();
    assert_ne!(session.identity(), issued);
}

#[test]
fn set_credential_drops_previous_profile() {
    let (session, _, _) = session_with(CachePolicy::Clear);
    session.set_credential("a").unwrap();
    session.set_profile(dummy_profile("alice")).unwrap();

    session.set_credential("b").unwrap();
    assert!(session.profile().is_none());
}

#[test]
fn set_credential_clears_persisted_profile_of_previous_user() {
    let (session, local, scoped) = session_with(CachePolicy::Clear);
    session.set_credential("a").unwrap();
    session.set_profile(dummy_profile("alice")).unwrap();

    session.set_credential("b").unwrap();
    assert_eq!(local.get(USER_INFO_KEY).unwrap(), None);

    let restored = Session::restore(local, scoped, CachePolicy::Clear).unwrap();
    assert_eq!(restored.credential().as_deref(), Some("b"));
    assert!(restored.profile().is_none());
}

#[test]
fn set_profile_persists_user_info() {
    let (session, local, _) = session_with(CachePolicy::Clear);
    session.set_credential("a").unwrap();
    session.set_profile(dummy_profile("alice")).unwrap();

    let stored: UserProfile = storage::load_json(&*local, USER_INFO_KEY).unwrap().unwrap();
    assert_eq!(stored, dummy_profile("alice"));
}

#[test]
fn logout_clears_profile_everywhere() {
    let (session, local, _) = session_with(CachePolicy::Keep);
    session.set_credential("a").unwrap();
    session.set_profile(dummy_profile("alice")).unwrap();

    session.logout();
    assert!(session.profile().is_none());
    assert_eq!(local.get(USER_INFO_KEY).unwrap(), None);
}

// =============================================================
// derived caches
// =============================================================

#[test]
fn logout_sweeps_caches_under_clear_policy() {
    let (session, local, scoped) = session_with(CachePolicy::Clear);
    seed_derived_caches(&*local, &*scoped);
    session.set_credential("a").unwrap();

    session.logout();

    assert_eq!(local.get(SMART_MATCH_TASK_STATE_KEY).unwrap(), None);
    assert_eq!(local.get(SMART_MATCH_STATE_KEY).unwrap(), None);
    assert!(local.keys().unwrap().iter().all(|k| !k.starts_with(MATCH_HISTORY_PREFIX)));
    assert_eq!(scoped.get(MATCHING_RESULTS_KEY).unwrap(), None);
    assert_eq!(local.get("theme").unwrap().as_deref(), Some("dark"));
}

#[test]
fn logout_keeps_caches_under_keep_policy() {
    let (session, local, scoped) = session_with(CachePolicy::Keep);
    seed_derived_caches(&*local, &*scoped);
    session.set_credential("a").unwrap();

    session.logout();

    assert!(local.get(SMART_MATCH_STATE_KEY).unwrap().is_some());
    assert!(local.get(&match_history_key("42")).unwrap().is_some());
    assert!(scoped.get(MATCHING_RESULTS_KEY).unwrap().is_some());
}

#[test]
fn invalidate_ignores_policy() {
    let (session, local, scoped) = session_with(CachePolicy::Keep);
    seed_derived_caches(&*local, &*scoped);

    session.invalidate_derived_caches().unwrap();
    assert_eq!(local.get(&match_history_key("alice")).unwrap(), None);
    assert_eq!(scoped.get(MATCHING_RESULTS_KEY).unwrap(), None);
}

#[test]
fn clones_share_state() {
    let (session, _, _) = session_with(CachePolicy::Clear);
    let other = session.clone();
    session.set_credential("shared").unwrap();
    assert!(other.is_logged_in());
    other.logout();
    assert!(!session.is_logged_in());
}

#[test]
fn debug_output_hides_credential() {
    let (session, _, _) = session_with(CachePolicy::Clear);
    session.set_credential("super-secret-jwt").unwrap();
    assert!(!format!("{session:?}").contains("super-secret-jwt"));
}
