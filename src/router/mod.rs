//! Client-side navigation: route table, auth guard, current location.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Router::navigate` is the single entry point for moving between views.
//! It runs the guard before every move, reading only the in-memory session
//! flag, and never awaits.

pub mod guard;
pub mod location;
pub mod routes;

#[cfg(test)]
#[path = "router_test.rs"]
mod router_test;

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::state::session::Session;
use guard::Decision;
use location::Location;
use routes::{HOME_PATH, ROUTES, RouteDescriptor, RouteMatch, match_route};

/// Guard redirects followed before giving up.
const MAX_REDIRECTS: usize = 3;
/// Locations kept in history; older ones are dropped.
const MAX_HISTORY: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouterError {
    #[error("invalid location '{0}'")]
    InvalidLocation(String),
    #[error("no route matches '{0}'")]
    NoMatch(String),
    #[error("too many redirects navigating to '{0}'")]
    RedirectLoop(String),
}

/// Result of a completed navigation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigation {
    pub location: Location,
    pub route: &'static RouteDescriptor,
    pub params: Vec<(&'static str, String)>,
    /// True when the guard sent us somewhere other than the requested target.
    pub redirected: bool,
}

#[derive(Debug)]
struct History {
    entries: Vec<Location>,
}

impl History {
    fn push(&mut self, location: Location) {
        self.entries.push(location);
        if self.entries.len() > MAX_HISTORY {
            let excess = self.entries.len() - MAX_HISTORY;
            self.entries.drain(..excess);
        }
    }
}

#[derive(Debug)]
pub struct Router {
    routes: &'static [RouteDescriptor],
    session: Session,
    history: Mutex<History>,
}

impl Router {
    /// Router over the built-in route table, starting at home.
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self::with_routes(ROUTES, session)
    }

    #[must_use]
    pub fn with_routes(routes: &'static [RouteDescriptor], session: Session) -> Self {
        Self {
            routes,
            session,
            history: Mutex::new(History { entries: vec![Location::new(HOME_PATH)] }),
        }
    }

    fn history(&self) -> MutexGuard<'_, History> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The location currently shown.
    #[must_use]
    pub fn current(&self) -> Location {
        self.history()
            .entries
            .last()
            .cloned()
            .unwrap_or_else(|| Location::new(HOME_PATH))
    }

    /// Route the current location resolves to.
    #[must_use]
    pub fn current_route(&self) -> Option<&'static RouteDescriptor> {
        match_route(self.routes, self.current().path()).map(|m| m.route)
    }

    /// Retained locations, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<Location> {
        self.history().entries.clone()
    }

    /// Parse `target` and navigate to it.
    ///
    /// # Errors
    ///
    /// See [`Router::navigate_to`]; also fails on an unparseable target.
    pub fn navigate(&self, target: &str) -> Result<Navigation, RouterError> {
        self.navigate_to(Location::parse(target)?)
    }

    /// Run the guard for `target`, follow its redirects, and record the
    /// final location as current.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::NoMatch`] when a location has no route and
    /// [`RouterError::RedirectLoop`] when redirects do not settle.
    pub fn navigate_to(&self, target: Location) -> Result<Navigation, RouterError> {
        let requested = target.href();
        let authenticated = self.session.is_logged_in();
        let mut location = target;
        let mut redirected = false;

        for _ in 0..=MAX_REDIRECTS {
            let RouteMatch { route, params } = self.resolve(location.path())?;
            match guard::evaluate(route, &location, authenticated) {
                Decision::Allow => {
                    tracing::debug!(to = %location, route = route.name, redirected, "navigated");
                    self.history().push(location.clone());
                    return Ok(Navigation { location, route, params, redirected });
                }
                Decision::Redirect(next) => {
                    tracing::debug!(from = %location, to = %next, "navigation redirected by guard");
                    location = next;
                    redirected = true;
                }
            }
        }
        Err(RouterError::RedirectLoop(requested))
    }

    fn resolve(&self, path: &str) -> Result<RouteMatch<'static>, RouterError> {
        match_route(self.routes, path).ok_or_else(|| RouterError::NoMatch(path.to_owned()))
    }
}
