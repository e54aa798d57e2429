//! Pre-navigation auth guard.
//!
//! Pure and synchronous: the only input besides the target is whether the
//! session currently holds a credential.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use super::location::Location;
use super::routes::{HOME_PATH, LOGIN_PATH, REDIRECT_PARAM, ROUTES, RouteDescriptor, match_route};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Redirect(Location),
}

/// Decide whether navigating to `target` (matched to `route`) may proceed.
#[must_use]
pub fn evaluate(route: &RouteDescriptor, target: &Location, authenticated: bool) -> Decision {
    if route.requires_auth && !authenticated {
        return Decision::Redirect(login_redirect(target));
    }
    if route.path == LOGIN_PATH && authenticated {
        return Decision::Redirect(post_login_target(target));
    }
    Decision::Allow
}

/// `/login?redirect=<intended path and query>`.
#[must_use]
pub fn login_redirect(intended: &Location) -> Location {
    Location::new(LOGIN_PATH).with_query(REDIRECT_PARAM, intended.href())
}

/// Where an authenticated visit to the login page should land instead.
///
/// Only a same-origin path that resolves to a known route other than the
/// login page itself is honoured; anything else falls back to home.
#[must_use]
pub fn post_login_target(login: &Location) -> Location {
    login
        .query(REDIRECT_PARAM)
        .and_then(|raw| Location::parse(raw).ok())
        .filter(|loc| match_route(ROUTES, loc.path()).is_some_and(|m| m.route.path != LOGIN_PATH))
        .unwrap_or_else(|| Location::new(HOME_PATH))
}
