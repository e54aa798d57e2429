//! Login, registration and profile operations for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `UserStore` is what login/register views call. It talks to the backend
//! through any [`Api`] (normally the interceptor-wrapped gateway) and
//! records the outcome in the shared [`Session`].
//!
//! ERROR HANDLING
//! ==============
//! Login and register collapse every failure into one user-readable message:
//! the server's `detail` when it sent one, otherwise a fixed fallback. A
//! login that fails after the credential was stored is rolled back with a
//! full logout, so a half-finished login never inherits old caches.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use std::sync::Arc;

use serde::Serialize;

use super::session::Session;
use super::storage::StorageError;
use crate::net::api::{Api, ApiRequest};
use crate::net::error::ApiError;
use crate::net::types::{LoginRequest, RegisterRequest, TokenResponse, UserProfile};

pub const LOGIN_PATH: &str = "/auth/login";
pub const REGISTER_PATH: &str = "/auth/register";
pub const ME_PATH: &str = "/auth/me";

pub const LOGIN_FAILED: &str = "login failed";
pub const REGISTER_FAILED: &str = "registration failed";

/// Failure of a session operation before it is turned into a message.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("unexpected response shape: {0}")]
    Malformed(String),
}

impl SessionError {
    fn detail(&self) -> Option<&str> {
        match self {
            Self::Api(e) => e.detail(),
            _ => None,
        }
    }
}

/// Login/register rejected, with a message fit to show the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("{0}")]
    Rejected(String),
}

pub struct UserStore {
    api: Arc<dyn Api>,
    session: Session,
}

impl UserStore {
    #[must_use]
    pub fn new(api: Arc<dyn Api>, session: Session) -> Self {
        Self { api, session }
    }

    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    /// Log in and return the freshly fetched profile.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] with the server's detail, or
    /// `"login failed"`.
    pub async fn login(&self, credentials: &LoginRequest) -> Result<UserProfile, AuthError> {
        self.authenticate(LOGIN_PATH, credentials, LOGIN_FAILED).await
    }

    /// Register a new account, then behave exactly like a login.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Rejected`] with the server's detail, or
    /// `"registration failed"`.
    pub async fn register(&self, data: &RegisterRequest) -> Result<UserProfile, AuthError> {
        self.authenticate(REGISTER_PATH, data, REGISTER_FAILED).await
    }

    /// Fetch `/auth/me` and cache it as the current profile.
    ///
    /// # Errors
    ///
    /// Propagates the gateway or storage failure after logging it.
    pub async fn get_user_info(&self) -> Result<UserProfile, SessionError> {
        let result = self.fetch_profile().await;
        if let Err(e) = &result {
            tracing::error!(error = %e, "failed to fetch user info");
        }
        result
    }

    /// Clear the session and, per cache policy, every derived cache.
    pub fn logout(&self) {
        self.session.logout();
    }

    async fn fetch_profile(&self) -> Result<UserProfile, SessionError> {
        let payload = self.api.send(ApiRequest::get(ME_PATH)).await?;
        let profile: UserProfile =
            serde_json::from_value(payload).map_err(|e| SessionError::Malformed(e.to_string()))?;
        self.session.set_profile(profile.clone())?;
        Ok(profile)
    }

    async fn authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        fallback: &str,
    ) -> Result<UserProfile, AuthError> {
        match self.try_authenticate(path, body).await {
            Ok(profile) => {
                tracing::info!(username = %profile.username, path, "authenticated");
                Ok(profile)
            }
            Err((e, credential_stored)) => {
                tracing::warn!(path, error = %e, "authentication failed");
                if credential_stored && self.session.is_logged_in() {
                    self.session.logout();
                }
                Err(AuthError::Rejected(e.detail().unwrap_or(fallback).to_owned()))
            }
        }
    }

    /// Credential storage strictly precedes the profile fetch. The error
    /// side reports whether a credential had already been stored.
    async fn try_authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<UserProfile, (SessionError, bool)> {
        let body = serde_json::to_value(body).map_err(|e| (SessionError::Malformed(e.to_string()), false))?;
        let payload = self.api.send(ApiRequest::post(path, body)).await.map_err(|e| (SessionError::from(e), false))?;
        let token: TokenResponse =
            serde_json::from_value(payload).map_err(|e| (SessionError::Malformed(e.to_string()), false))?;
        if token.access_token.is_empty() {
            return Err((SessionError::Malformed("empty access_token".to_owned()), false));
        }

        self.session
            .set_credential(&token.access_token)
            .map_err(|e| (SessionError::from(e), false))?;
        let profile = self.get_user_info().await.map_err(|e| (e, true))?;
        self.session.sweep_if_configured().map_err(|e| (SessionError::from(e), true))?;
        Ok(profile)
    }
}
