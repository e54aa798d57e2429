//! Failure taxonomy for gateway calls.
//!
//! ERROR HANDLING
//! ==============
//! Every way a request can fail collapses into one `ApiError` variant so the
//! interceptor can pick exactly one reaction per failure. Status variants
//! keep the server's `detail` message when one was sent.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// 401: the credential is missing, expired, or rejected.
    #[error("authentication expired or invalid")]
    AuthenticationExpired { detail: Option<String> },

    /// 403.
    #[error("permission denied")]
    AuthorizationDenied { detail: Option<String> },

    /// 404.
    #[error("resource not found")]
    NotFound { detail: Option<String> },

    /// 500.
    #[error("internal server error")]
    ServerFault { detail: Option<String> },

    /// Any other non-success status.
    #[error("request failed with status {status}")]
    Http { status: u16, detail: Option<String> },

    /// No response within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// No response for any other transport reason.
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    /// The request could not be constructed (bad URL, bad header value).
    #[error("request configuration error: {0}")]
    RequestConfiguration(String),

    /// A success response whose body was not valid JSON.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The session identity changed while the request was in flight.
    #[error("response discarded: session changed while request was in flight")]
    StaleSession,
}

impl ApiError {
    /// Classify a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: u16, detail: Option<String>) -> Self {
        match status {
            401 => Self::AuthenticationExpired { detail },
            403 => Self::AuthorizationDenied { detail },
            404 => Self::NotFound { detail },
            500 => Self::ServerFault { detail },
            _ => Self::Http { status, detail },
        }
    }

    /// Classify a transport-level failure where no response was received.
    #[must_use]
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_builder() {
            Self::RequestConfiguration(err.to_string())
        } else if err.is_timeout() {
            Self::Timeout
        } else {
            Self::NetworkUnreachable(err.to_string())
        }
    }

    /// HTTP status for status-class failures.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationExpired { .. } => Some(401),
            Self::AuthorizationDenied { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::ServerFault { .. } => Some(500),
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Server-provided `detail`, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::AuthenticationExpired { detail }
            | Self::AuthorizationDenied { detail }
            | Self::NotFound { detail }
            | Self::ServerFault { detail }
            | Self::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }
}
