//! Client configuration parsed from environment variables.
//!
//! DESIGN
//! ======
//! Every knob has a default so a bare environment yields a working client
//! pointed at a local backend. CLI flags layer on top of `from_env`.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ORIGIN: &str = "http://127.0.0.1:8000";
pub const API_BASE_PATH: &str = "/api";
/// Matching runs can take minutes on the backend.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 300_000;
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_STATE_DIR: &str = ".papermatch";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config parse failed: {0}")]
    Parse(String),
}

/// What happens to derived per-session caches when the session identity changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Sweep match state, match history and result snapshots on login,
    /// register and logout.
    #[default]
    Clear,
    /// Only the credential and profile are touched.
    Keep,
}

impl CachePolicy {
    /// Parse `clear` / `keep`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for any other value.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "keep" => Ok(Self::Keep),
            other => Err(ConfigError::Parse(format!(
                "unknown cache policy '{other}' (expected 'clear' or 'keep')"
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub request: Duration,
    pub connect: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            request: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
            connect: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Scheme + host (+ port) of the backend, without a trailing slash.
    pub origin: String,
    pub timeouts: Timeouts,
    /// Directory holding the persisted key-value file.
    pub state_dir: PathBuf,
    pub cache_policy: CachePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            origin: DEFAULT_ORIGIN.to_owned(),
            timeouts: Timeouts::default(),
            state_dir: PathBuf::from(DEFAULT_STATE_DIR),
            cache_policy: CachePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `PAPERMATCH_ORIGIN`: default `http://127.0.0.1:8000`
    /// - `PAPERMATCH_TIMEOUT_MS`: default 300000
    /// - `PAPERMATCH_CONNECT_TIMEOUT_MS`: default 10000
    /// - `PAPERMATCH_STATE_DIR`: default `.papermatch`
    /// - `PAPERMATCH_CACHE_POLICY`: `clear` (default) or `keep`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when a numeric value or the cache
    /// policy cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        let origin = normalize_origin(
            &std::env::var("PAPERMATCH_ORIGIN").unwrap_or_else(|_| DEFAULT_ORIGIN.to_owned()),
        );
        let timeouts = Timeouts {
            request: Duration::from_millis(env_parse_u64(
                "PAPERMATCH_TIMEOUT_MS",
                DEFAULT_REQUEST_TIMEOUT_MS,
            )?),
            connect: Duration::from_millis(env_parse_u64(
                "PAPERMATCH_CONNECT_TIMEOUT_MS",
                DEFAULT_CONNECT_TIMEOUT_MS,
            )?),
        };
        let state_dir = std::env::var("PAPERMATCH_STATE_DIR")
            .map_or_else(|_| PathBuf::from(DEFAULT_STATE_DIR), PathBuf::from);
        let cache_policy = match std::env::var("PAPERMATCH_CACHE_POLICY") {
            Ok(raw) => CachePolicy::parse(&raw)?,
            Err(_) => CachePolicy::default(),
        };

        Ok(Self { origin, timeouts, state_dir, cache_policy })
    }

    /// Absolute base URL every API path is joined to.
    #[must_use]
    pub fn api_base_url(&self) -> String {
        format!("{}{API_BASE_PATH}", self.origin)
    }
}

pub(crate) fn normalize_origin(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_owned()
}

fn env_parse_u64(key: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::Parse(format!("{key} must be an integer, got '{raw}'"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
