//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! `Session` is the one shared handle the router guard, the HTTP gateway and
//! the user store all read. Cloning it is cheap; every clone sees the same
//! credential, profile and identity.
//!
//! DESIGN
//! ======
//! - The credential and profile live in memory and are mirrored to the
//!   persistent store under `token` / `userInfo`.
//! - `identity` is regenerated on every credential change so in-flight
//!   requests can detect that the session they were issued for is gone.
//! - Derived caches written by match features are swept on every identity
//!   change when the cache policy is `Clear`.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use uuid::Uuid;

use super::storage::{self, KeyValueStore, StorageError};
use crate::config::CachePolicy;
use crate::net::types::UserProfile;

pub const TOKEN_KEY: &str = "token";
pub const USER_INFO_KEY: &str = "userInfo";
pub const SMART_MATCH_TASK_STATE_KEY: &str = "smartMatchTaskState";
pub const SMART_MATCH_STATE_KEY: &str = "smartMatchState";
pub const MATCH_HISTORY_PREFIX: &str = "matchHistory_";
/// Lives in the session-scoped store, not the persistent one.
pub const MATCHING_RESULTS_KEY: &str = "matchingResults";

/// Persistent key for the match history of `owner`.
#[must_use]
pub fn match_history_key(owner: &str) -> String {
    format!("{MATCH_HISTORY_PREFIX}{owner}")
}

#[derive(Debug)]
struct SessionState {
    credential: Option<String>,
    profile: Option<UserProfile>,
    identity: Uuid,
}

struct Inner {
    state: RwLock<SessionState>,
    local: Arc<dyn KeyValueStore>,
    scoped: Arc<dyn KeyValueStore>,
    cache_policy: CachePolicy,
}

/// Shared handle to the current login session.
#[derive(Clone)]
pub struct Session {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.read();
        f.debug_struct("Session")
            .field("logged_in", &state.credential.is_some())
            .field("identity", &state.identity)
            .field("cache_policy", &self.inner.cache_policy)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Build a session, restoring credential and profile from `local` when present.
    ///
    /// `scoped` holds state that only lives as long as the process.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the persistent store cannot be read.
    pub fn restore(
        local: Arc<dyn KeyValueStore>,
        scoped: Arc<dyn KeyValueStore>,
        cache_policy: CachePolicy,
    ) -> Result<Self, StorageError> {
        let credential = local.get(TOKEN_KEY)?.filter(|t| !t.is_empty());
        let profile = if credential.is_some() {
            storage::load_json::<UserProfile>(local.as_ref(), USER_INFO_KEY)?
        } else {
            None
        };
        tracing::debug!(restored = credential.is_some(), "session restored");

        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(SessionState { credential, profile, identity: Uuid::new_v4() }),
                local,
                scoped,
                cache_policy,
            }),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, SessionState> {
        self.inner.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.inner.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// True iff a credential is held. Never touches the network.
    #[must_use]
    pub fn is_logged_in(&self) -> bool {
        self.read().credential.is_some()
    }

    #[must_use]
    pub fn credential(&self) -> Option<String> {
        self.read().credential.clone()
    }

    #[must_use]
    pub fn profile(&self) -> Option<UserProfile> {
        self.read().profile.clone()
    }

    /// Identity of the current session; changes whenever the credential does.
    #[must_use]
    pub fn identity(&self) -> Uuid {
        self.read().identity
    }

    /// Credential and identity read under one lock, for tagging a request.
    #[must_use]
    pub fn snapshot(&self) -> (Option<String>, Uuid) {
        let state = self.read();
        (state.credential.clone(), state.identity)
    }

    #[must_use]
    pub fn cache_policy(&self) -> CachePolicy {
        self.inner.cache_policy
    }

    /// Persistent store shared with feature code (match state, history).
    #[must_use]
    pub fn local_store(&self) -> &dyn KeyValueStore {
        self.inner.local.as_ref()
    }

    /// Store a new credential and start a new session identity.
    ///
    /// The persistent writes happen first; on failure memory is untouched.
    /// Any cached profile belongs to the previous credential and is dropped
    /// from memory and from `userInfo`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the credential cannot be persisted.
    pub fn set_credential(&self, token: &str) -> Result<Uuid, StorageError> {
        self.inner.local.remove(USER_INFO_KEY)?;
        self.inner.local.set(TOKEN_KEY, token)?;
        let mut state = self.write();
        state.credential = Some(token.to_owned());
        state.profile = None;
        state.identity = Uuid::new_v4();
        Ok(state.identity)
    }

    /// Cache `profile` in memory and in `userInfo`.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] when the profile cannot be persisted.
    pub fn set_profile(&self, profile: UserProfile) -> Result<(), StorageError> {
        storage::save_json(self.inner.local.as_ref(), USER_INFO_KEY, &profile)?;
        self.write().profile = Some(profile);
        Ok(())
    }

    /// Clear credential and profile everywhere, then sweep derived caches
    /// when the policy says so.
    ///
    /// Memory is always cleared. Storage failures are logged; the session
    /// is considered logged out regardless.
    pub fn logout(&self) {
        {
            let mut state = self.write();
            state.credential = None;
            state.profile = None;
            state.identity = Uuid::new_v4();
        }
        for key in [TOKEN_KEY, USER_INFO_KEY] {
            if let Err(e) = self.inner.local.remove(key) {
                tracing::warn!(key, error = %e, "failed to clear persisted session key");
            }
        }
        if let Err(e) = self.sweep_if_configured() {
            tracing::warn!(error = %e, "failed to clear derived caches on logout");
        }
        tracing::info!("session cleared");
    }

    /// Sweep derived caches if the cache policy is `Clear`.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] hit during the sweep.
    pub fn sweep_if_configured(&self) -> Result<(), StorageError> {
        match self.inner.cache_policy {
            CachePolicy::Clear => self.invalidate_derived_caches(),
            CachePolicy::Keep => Ok(()),
        }
    }

    /// Remove every derived per-session cache regardless of policy.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] hit during the sweep.
    pub fn invalidate_derived_caches(&self) -> Result<(), StorageError> {
        let local = self.inner.local.as_ref();
        local.remove(SMART_MATCH_TASK_STATE_KEY)?;
        local.remove(SMART_MATCH_STATE_KEY)?;
        let histories = storage::remove_prefixed(local, MATCH_HISTORY_PREFIX)?;
        self.inner.scoped.remove(MATCHING_RESULTS_KEY)?;
        tracing::debug!(histories, "derived caches invalidated");
        Ok(())
    }
}
