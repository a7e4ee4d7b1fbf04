use std::fmt;

use thiserror::Error;

/// Errors surfaced by the dashboard client.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{path} returned {status}")]
    Status {
        path: String,
        status: reqwest::StatusCode,
    },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Trigger command failed: {0}")]
    Trigger(String),

    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to fetch category list: {0}")]
    Directory(Box<DashboardError>),

    #[error("Sync engine is no longer running")]
    EngineStopped,
}

/// Why a long-poll failed. Intentional cancellation is not a failure and has no kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    Timeout,
    NetworkError,
    ServerError,
    MalformedResponse,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FailureKind::Timeout => "timeout",
            FailureKind::NetworkError => "network error",
            FailureKind::ServerError => "server error",
            FailureKind::MalformedResponse => "malformed response",
        };
        f.write_str(label)
    }
}

impl DashboardError {
    /// Classify a poll error for the retry policy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            DashboardError::Http(err) if err.is_timeout() => FailureKind::Timeout,
            DashboardError::Http(err) if err.is_decode() => FailureKind::MalformedResponse,
            DashboardError::Http(err) if err.is_status() => FailureKind::ServerError,
            DashboardError::Status { .. } => FailureKind::ServerError,
            DashboardError::Malformed(_) => FailureKind::MalformedResponse,
            DashboardError::Directory(inner) => inner.failure_kind(),
            _ => FailureKind::NetworkError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_non_transport_errors() {
        let status = DashboardError::Status {
            path: "/api/prod".to_string(),
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert_eq!(status.failure_kind(), FailureKind::ServerError);
        assert_eq!(
            DashboardError::Malformed("no index".to_string()).failure_kind(),
            FailureKind::MalformedResponse
        );
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionReset, "reset");
        assert_eq!(
            DashboardError::Io(io).failure_kind(),
            FailureKind::NetworkError
        );
    }
}
