//! HTTP gateway for the matching backend's REST API.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every backend call goes through [`Api::send`]. `HttpGateway` is the real
//! transport; the interceptor in `crate::app` wraps it with notifications and
//! the 401 logout/redirect chain, and tests substitute mocks.
//!
//! ERROR HANDLING
//! ==============
//! The gateway only classifies. It never notifies or navigates; callers get a
//! tagged [`ApiError`] and decide what to do with it.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::time::{Duration, Instant};

use reqwest::Method;
use serde_json::Value;
use uuid::Uuid;

use super::error::ApiError;
use super::types::error_detail;
use crate::config::ClientConfig;
use crate::state::session::Session;

/// Per-request overrides.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Replaces the configured request timeout for this call only.
    pub timeout: Option<Duration>,
    /// Query-string pairs appended to the URL.
    pub query: Vec<(String, String)>,
}

/// One call against the API, relative to the `/api` base path.
#[derive(Clone, Debug, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub options: RequestOptions,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), body: None, options: RequestOptions::default() }
    }

    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    #[must_use]
    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options.timeout = Some(timeout);
        self
    }

    #[must_use]
    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.query.push((key.into(), value.into()));
        self
    }
}

/// Async request seam. Enables mocking in tests.
#[async_trait::async_trait]
pub trait Api: Send + Sync {
    /// Send `request` and return the decoded JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an [`ApiError`] classifying the failure.
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError>;
}

pub struct HttpGateway {
    http: reqwest::Client,
    base_url: String,
    timeout: Duration,
    session: Session,
}

impl HttpGateway {
    /// Build a gateway reading credentials from `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::RequestConfiguration`] if the HTTP client cannot
    /// be constructed.
    pub fn new(config: &ClientConfig, session: Session) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeouts.connect)
            .build()
            .map_err(|e| ApiError::RequestConfiguration(e.to_string()))?;
        Ok(Self { http, base_url: config.api_base_url(), timeout: config.timeouts.request, session })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Transport failures of a request from a previous session are stale too.
    fn transport_failure(&self, err: &reqwest::Error, identity: Uuid) -> ApiError {
        if self.session.identity() != identity {
            return ApiError::StaleSession;
        }
        ApiError::from_transport(err)
    }
}

#[async_trait::async_trait]
impl Api for HttpGateway {
    async fn send(&self, request: ApiRequest) -> Result<Value, ApiError> {
        let (credential, identity) = self.session.snapshot();
        let url = self.url(&request.path);

        let mut builder = self
            .http
            .request(request.method.clone(), &url)
            .timeout(request.options.timeout.unwrap_or(self.timeout));
        if !request.options.query.is_empty() {
            builder = builder.query(&request.options.query);
        }
        if let Some(token) = credential.as_deref() {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| {
            let err = self.transport_failure(&e, identity);
            tracing::debug!(method = %request.method, path = %request.path, error = %err, "request failed without response");
            err
        })?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| self.transport_failure(&e, identity))?;
        tracing::debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "request completed"
        );

        if self.session.identity() != identity {
            tracing::debug!(path = %request.path, "discarding response issued under a previous session");
            return Err(ApiError::StaleSession);
        }

        if !status.is_success() {
            let body = serde_json::from_slice::<Value>(&bytes).unwrap_or(Value::Null);
            return Err(ApiError::from_status(status.as_u16(), error_detail(&body)));
        }

        if bytes.is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }
}
