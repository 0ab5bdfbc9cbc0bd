//! Error types for remote collaborators.

use thiserror::Error;

/// Errors reported by a remote read or write operation.
///
/// Collaborators map their transport-specific failures into one of these.
/// The data-access layer only needs a displayable message; the variants
/// exist so callers can still branch on the failure kind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The service answered with a failure status.
    #[error("service returned {code}: {message}")]
    Status {
        /// Status code reported by the service.
        code: u16,
        /// Human-readable message from the service.
        message: String,
    },

    /// The response could not be decoded.
    #[error("decode error: {0}")]
    Decode(String),

    /// Any other failure.
    #[error("{0}")]
    Other(String),
}

impl RemoteError {
    /// Convenience constructor for [`RemoteError::Other`].
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl From<serde_json::Error> for RemoteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}
