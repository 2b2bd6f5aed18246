//! Error types and handling for the Wayfarer service

use std::fmt;

use thiserror::Error;

/// Classification of a provider call failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The upstream did not answer within the per-call timeout
    Timeout,
    /// Connection-level failure (DNS, TLS, refused)
    Transport,
    /// Credential rejected by the upstream (401/403)
    Auth,
    /// Upstream rate limit hit (429)
    RateLimit,
    /// Response body could not be decoded
    Decode,
    /// Any other non-success upstream response
    Upstream,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::Transport => "transport",
            FailureKind::Auth => "authentication",
            FailureKind::RateLimit => "rate limit",
            FailureKind::Decode => "decode",
            FailureKind::Upstream => "upstream",
        };
        write!(f, "{label}")
    }
}

/// Outcome of a single provider adapter call.
///
/// `Unavailable` is a legitimate non-exceptional outcome (no credential
/// configured, place not found); `Failed` is a fault talking to the upstream.
/// The orchestrator converts both into fallback data, never into a request
/// failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    #[error("{kind} error: {detail}")]
    Failed { kind: FailureKind, detail: String },
}

/// Result type returned by every provider adapter
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

impl ProviderError {
    pub fn unavailable<S: Into<String>>(reason: S) -> Self {
        Self::Unavailable(reason.into())
    }

    pub fn failed<S: Into<String>>(kind: FailureKind, detail: S) -> Self {
        Self::Failed {
            kind,
            detail: detail.into(),
        }
    }

    /// Classify a non-success HTTP status from an upstream
    #[must_use]
    pub fn from_status(status: u16, provider: &str) -> Self {
        match status {
            401 | 403 => Self::failed(
                FailureKind::Auth,
                format!("{provider} rejected the configured credential ({status})"),
            ),
            404 => Self::unavailable(format!("{provider} has no data for this query")),
            429 => Self::failed(FailureKind::RateLimit, format!("{provider} rate limit exceeded")),
            _ => Self::failed(FailureKind::Upstream, format!("{provider} returned status {status}")),
        }
    }

    /// Whether this failure is a credential problem. Logged at error severity
    /// since it needs operator attention, unlike transient upstream trouble.
    #[must_use]
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ProviderError::Failed {
                kind: FailureKind::Auth,
                ..
            }
        )
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::failed(FailureKind::Timeout, err.to_string())
        } else if err.is_connect() {
            Self::failed(FailureKind::Transport, err.to_string())
        } else if err.is_decode() {
            Self::failed(FailureKind::Decode, err.to_string())
        } else {
            Self::failed(FailureKind::Transport, err.to_string())
        }
    }
}

impl From<reqwest_middleware::Error> for ProviderError {
    fn from(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(e) => e.into(),
            reqwest_middleware::Error::Middleware(e) => {
                Self::failed(FailureKind::Transport, e.to_string())
            }
        }
    }
}

/// Request-level error type for the Wayfarer service
#[derive(Error, Debug)]
pub enum TravelError {
    /// Input validation errors, surfaced to the caller as 400
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Cache operation errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Unexpected programming faults, surfaced as 500 with a generic message
    #[error("Internal error: {0}")]
    Internal(String),
}

impl TravelError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get a user-facing error message that never leaks internals verbatim
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            TravelError::Validation(message) => format!("Invalid input: {message}"),
            TravelError::Cache(..) => "A storage operation failed.".to_string(),
            TravelError::Internal(..) => {
                "An error occurred while fetching travel information".to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        assert!(ProviderError::from_status(401, "geoapify").is_auth());
        assert!(ProviderError::from_status(403, "geoapify").is_auth());
        assert!(matches!(
            ProviderError::from_status(404, "wikipedia"),
            ProviderError::Unavailable(_)
        ));
        assert!(matches!(
            ProviderError::from_status(429, "unsplash"),
            ProviderError::Failed {
                kind: FailureKind::RateLimit,
                ..
            }
        ));
        assert!(matches!(
            ProviderError::from_status(503, "openweather"),
            ProviderError::Failed {
                kind: FailureKind::Upstream,
                ..
            }
        ));
    }

    #[test]
    fn test_user_messages() {
        let validation = TravelError::validation("place must not be empty");
        assert!(validation.user_message().contains("place must not be empty"));

        let internal = TravelError::internal("index out of bounds");
        assert!(!internal.user_message().contains("index out of bounds"));
    }
}
