//! In-app locations (`/path?query`).
//!
//! Parsing goes through `reqwest::Url` against a fixed local origin, so
//! percent-encoding matches what a browser would produce and anything that
//! resolves to another origin is rejected.

#[cfg(test)]
#[path = "location_test.rs"]
mod location_test;

use std::fmt;

use reqwest::Url;

use super::RouterError;

const LOCAL_ORIGIN: &str = "http://app.local/";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Location {
    path: String,
    query: Vec<(String, String)>,
}

fn local_origin() -> Result<Url, RouterError> {
    Url::parse(LOCAL_ORIGIN).map_err(|e| RouterError::InvalidLocation(e.to_string()))
}

impl Location {
    /// A location with `path` and no query.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), query: Vec::new() }
    }

    /// Parse an in-app reference such as `/search?q=rust`. Fragments are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`RouterError::InvalidLocation`] for anything that is not a
    /// same-origin absolute path.
    pub fn parse(raw: &str) -> Result<Self, RouterError> {
        let raw = raw.trim();
        if !raw.starts_with('/') || raw.starts_with("//") || raw.starts_with("/\\") {
            return Err(RouterError::InvalidLocation(raw.to_owned()));
        }
        let base = local_origin()?;
        let url = base
            .join(raw)
            .map_err(|_| RouterError::InvalidLocation(raw.to_owned()))?;
        if url.origin() != base.origin() {
            return Err(RouterError::InvalidLocation(raw.to_owned()));
        }
        Ok(Self {
            path: url.path().to_owned(),
            query: url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect(),
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// First value for `key`, decoded.
    #[must_use]
    pub fn query(&self, key: &str) -> Option<&str> {
        self.query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    /// Path plus encoded query, as it would appear in the address bar.
    #[must_use]
    pub fn href(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let Ok(mut url) = local_origin() else {
            return self.path.clone();
        };
        url.query_pairs_mut().extend_pairs(&self.query);
        format!("{}?{}", self.path, url.query().unwrap_or_default())
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.href())
    }
}
