//! Error types for the edge worker adapter.
//!
//! [`HostError`] is raised by [`HostBridge`](crate::HostBridge)
//! implementations and travels through this crate untouched. [`Error`]
//! covers the few failures the adapter produces on its own.

use thiserror::Error;

/// Result type alias for adapter operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures reported by the host runtime.
///
/// The adapter never constructs, retries or translates these; they are
/// whatever the host raised for a constructor call, a body read or a fetch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The host rejected the options given to a response or request constructor.
    #[error("construction rejected: {0}")]
    Construction(String),

    /// The body stream was already read once.
    #[error("body stream already consumed")]
    BodyUsed,

    /// The body stream failed or was truncated while reading.
    #[error("body read failed: {0}")]
    Body(String),

    /// The outbound fetch failed at the transport level.
    #[error("network error: {0}")]
    Network(String),

    /// A primitive was used while no invocation could service it.
    #[error("host primitive unavailable: {0}")]
    Unavailable(String),
}

/// Errors produced by the adapter itself.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Host(#[from] HostError),

    #[error("unsupported HTTP method: {0}")]
    UnknownMethod(String),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_error_display() {
        assert_eq!(HostError::BodyUsed.to_string(), "body stream already consumed");
        assert_eq!(
            HostError::Network("connection refused".into()).to_string(),
            "network error: connection refused"
        );
    }

    #[test]
    fn host_error_survives_anyhow() {
        let err: anyhow::Error = HostError::Construction("status 42".into()).into();
        assert_eq!(
            err.downcast_ref::<HostError>(),
            Some(&HostError::Construction("status 42".into()))
        );
    }

    #[test]
    fn unknown_method_display() {
        let err = Error::UnknownMethod("BREW".into());
        assert_eq!(format!("{err}"), "unsupported HTTP method: BREW");
    }

    #[test]
    fn host_error_is_wrapped_transparently() {
        let err = Error::from(HostError::BodyUsed);
        assert_eq!(err.to_string(), "body stream already consumed");
        assert!(matches!(err, Error::Host(HostError::BodyUsed)));
    }

    #[test]
    fn error_is_std_error() {
        let err = Error::UnknownMethod("TRACE".into());
        let _: &dyn std::error::Error = &err;
    }
}
