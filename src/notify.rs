//! User-facing notifications raised by failed requests.
//!
//! SYSTEM CONTEXT
//! ==============
//! The interceptor turns each [`ApiError`] into at most one [`Notice`] and
//! hands it to a [`Notifier`]. How a notice is shown (toast, stderr, log)
//! is the notifier's business.

#[cfg(test)]
#[path = "notify_test.rs"]
mod notify_test;

use crate::net::error::ApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NoticeKind {
    SessionExpired,
    PermissionDenied,
    NotFound,
    ServerError,
    RequestFailed,
    Timeout,
    NetworkUnreachable,
    RequestConfiguration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    fn new(kind: NoticeKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    /// The notice for `err`, or `None` for failures that stay silent.
    #[must_use]
    pub fn for_error(err: &ApiError) -> Option<Self> {
        let notice = match err {
            ApiError::AuthenticationExpired { .. } => Self::new(
                NoticeKind::SessionExpired,
                "Login expired or credential invalid, please log in again",
            ),
            ApiError::AuthorizationDenied { .. } => Self::new(NoticeKind::PermissionDenied, "Insufficient permission"),
            ApiError::NotFound { .. } => Self::new(NoticeKind::NotFound, "The requested resource does not exist"),
            ApiError::ServerFault { .. } => Self::new(NoticeKind::ServerError, "Internal server error"),
            ApiError::Http { detail, .. } => {
                Self::new(NoticeKind::RequestFailed, detail.as_deref().unwrap_or("Request failed"))
            }
            ApiError::Decode(_) => Self::new(NoticeKind::RequestFailed, "Request failed"),
            ApiError::Timeout => Self::new(
                NoticeKind::Timeout,
                "Request timed out; matching can take a while, please retry later",
            ),
            ApiError::NetworkUnreachable(_) => Self::new(
                NoticeKind::NetworkUnreachable,
                "Network connection failed, please check your network",
            ),
            ApiError::RequestConfiguration(_) => {
                Self::new(NoticeKind::RequestConfiguration, "Request configuration error")
            }
            ApiError::StaleSession => return None,
        };
        Some(notice)
    }
}

pub trait Notifier: Send + Sync {
    fn notify(&self, notice: &Notice);
}

/// Prints notices on stderr for interactive use.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, notice: &Notice) {
        tracing::debug!(kind = ?notice.kind, "notice shown");
        eprintln!("error: {}", notice.message);
    }
}
