//! Composition root and response interceptor.
//!
//! SYSTEM CONTEXT
//! ==============
//! `App` wires one shared [`Session`] into the router, the HTTP gateway and
//! the user store. Requests from the user store go through [`Interceptor`],
//! which owns every UI side effect of a failed request:
//!
//! - 401: log out, notify, navigate to `/login?redirect=<here>` unless
//!   already on the login page.
//! - anything else: one notice per failure.
//!
//! The error itself is always handed back to the caller afterwards.

#[cfg(test)]
#[path = "app_test.rs"]
mod app_test;

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::net::api::{Api, ApiRequest, HttpGateway};
use crate::net::error::ApiError;
use crate::notify::{Notice, Notifier};
use crate::router::Router;
use crate::router::guard::login_redirect;
use crate::router::routes::LOGIN_PATH;
use crate::state::session::Session;
use crate::state::storage::{KeyValueStore, StorageError};
use crate::state::user::UserStore;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("failed to restore session: {0}")]
    Storage(#[from] StorageError),
    #[error("failed to build HTTP gateway: {0}")]
    Gateway(#[from] ApiError),
}

/// Wraps an [`Api`] with notifications and the 401 logout/redirect chain.
pub struct Interceptor {
    inner: Arc<dyn Api>,
    session: Session,
    router: Arc<Router>,
    notifier: Arc<dyn Notifier>,
}

impl Interceptor {
    #[must_use]
    pub fn new(inner: Arc<dyn Api>, session: Session, router: Arc<Router>, notifier: Arc<dyn Notifier>) -> Self {
        Self { inner, session, router, notifier }
    }

    fn handle_failure(&self, err: &ApiError) {
        let expired = matches!(err, ApiError::AuthenticationExpired { .. });
        if expired {
            self.session.logout();
        }
        if let Some(notice) = Notice::for_error(err) {
            self.notifier.notify(&notice);
        }
        if expired {
            self.redirect_to_login();
        }
    }

    fn redirect_to_login(&self) {
        if self.router.current_route().is_some_and(|r| r.path == LOGIN_PATH) {
            return;
        }
        let here = self.router.current();
        if let Err(e) = self.router.navigate_to(login_redirect(&here)) {
            tracing::warn!(error = %e, "failed to redirect to login after 401");
        }
    }
}

#[async_trait::async_trait]
impl Api for Interceptor {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let path = request.path.clone();
        match self.inner.send(request).await {
            Ok(value) => Ok(value),
            Err(err) => {
                tracing::debug!(%path, status = ?err.status(), error = %err, "request failed");
                self.handle_failure(&err);
                Err(err)
            }
        }
    }
}

/// Everything a front end needs, sharing one session.
pub struct App {
    pub session: Session,
    pub router: Arc<Router>,
    pub api: Arc<Interceptor>,
    pub user: UserStore,
}

impl App {
    /// Restore the session from `local` and connect to the configured backend.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when storage cannot be read or the HTTP client
    /// cannot be built.
    pub fn new(
        config: &ClientConfig,
        local: Arc<dyn KeyValueStore>,
        scoped: Arc<dyn KeyValueStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        let session = Session::restore(local, scoped, config.cache_policy)?;
        let gateway = Arc::new(HttpGateway::new(config, session.clone())?);
        Ok(Self::with_transport(session, gateway, notifier))
    }

    /// Assemble around an existing session and transport.
    #[must_use]
    pub fn with_transport(session: Session, transport: Arc<dyn Api>, notifier: Arc<dyn Notifier>) -> Self {
        let router = Arc::new(Router::new(session.clone()));
        let api = Arc::new(Interceptor::new(transport, session.clone(), router.clone(), notifier));
        let user = UserStore::new(api.clone(), session.clone());
        Self { session, router, api, user }
    }
}
