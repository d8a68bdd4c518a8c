//! Error types for the car cost advisor

use axum::http::StatusCode;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Result type alias for advisor operations
pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Closed set of failure kinds an upstream boundary adapter can report.
///
/// Adapters classify from HTTP status and transport errors, never from the
/// provider's free-text message.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamErrorKind {
    Unauthenticated,
    RateLimited,
    Unreachable,
    Unknown,
}

impl UpstreamErrorKind {
    /// Classify an HTTP status returned by an upstream service.
    pub fn from_status(status: reqwest::StatusCode) -> Self {
        match status.as_u16() {
            401 | 403 => UpstreamErrorKind::Unauthenticated,
            429 => UpstreamErrorKind::RateLimited,
            502..=504 => UpstreamErrorKind::Unreachable,
            _ => UpstreamErrorKind::Unknown,
        }
    }

    /// Classify a transport-level reqwest failure.
    pub fn from_transport(err: &reqwest::Error) -> Self {
        if err.is_connect() || err.is_timeout() {
            UpstreamErrorKind::Unreachable
        } else if let Some(status) = err.status() {
            Self::from_status(status)
        } else {
            UpstreamErrorKind::Unknown
        }
    }
}

impl fmt::Display for UpstreamErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UpstreamErrorKind::Unauthenticated => "unauthenticated",
            UpstreamErrorKind::RateLimited => "rate limited",
            UpstreamErrorKind::Unreachable => "unreachable",
            UpstreamErrorKind::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

#[derive(Error, Debug)]
pub enum AdvisorError {

    // =============================
    // Domain Errors
    // =============================

    #[error("Invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{service} {kind}: {detail}")]
    Upstream {
        service: &'static str,
        kind: UpstreamErrorKind,
        detail: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl AdvisorError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        AdvisorError::Validation {
            field,
            reason: reason.into(),
        }
    }

    pub fn upstream(
        service: &'static str,
        kind: UpstreamErrorKind,
        detail: impl Into<String>,
    ) -> Self {
        AdvisorError::Upstream {
            service,
            kind,
            detail: detail.into(),
        }
    }

    /// Upstream failure kind, if this error came from a boundary adapter.
    pub fn upstream_kind(&self) -> Option<UpstreamErrorKind> {
        match self {
            AdvisorError::Upstream { kind, .. } => Some(*kind),
            AdvisorError::HttpError(e) => Some(UpstreamErrorKind::from_transport(e)),
            _ => None,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AdvisorError::Validation { .. } => StatusCode::BAD_REQUEST,
            AdvisorError::NotFound(_) => StatusCode::NOT_FOUND,
            AdvisorError::Upstream { kind, .. } => match kind {
                UpstreamErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
                UpstreamErrorKind::Unreachable => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::BAD_GATEWAY,
            },
            AdvisorError::HttpError(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show an end user. Upstream detail stays in the logs.
    pub fn user_hint(&self) -> String {
        match self.upstream_kind() {
            Some(UpstreamErrorKind::Unauthenticated) => {
                "The assistant is misconfigured: its API credentials were rejected.".to_string()
            }
            Some(UpstreamErrorKind::RateLimited) => {
                "API quota exceeded. Please wait a minute and try again.".to_string()
            }
            Some(UpstreamErrorKind::Unreachable) => {
                "The service is not reachable right now. Please try again shortly.".to_string()
            }
            Some(UpstreamErrorKind::Unknown) => {
                "Failed to generate a response. Please try again.".to_string()
            }
            None => match self {
                AdvisorError::Config(_) => {
                    "The service is not configured. Check the server environment.".to_string()
                }
                AdvisorError::Validation { .. } | AdvisorError::NotFound(_) => self.to_string(),
                _ => "Internal error.".to_string(),
            },
        }
    }
}
