//! Collaborator fault types.
//!
//! This module defines the error type surfaced by the external
//! collaborators this core consumes: the client-details store and the
//! authentication backend. Component-level errors (client resolution,
//! token codec, issuance, introspection) live next to their components
//! and wrap these faults as causes where diagnostics matter.

/// Errors raised by external collaborators (storage, authentication).
///
/// Nothing in this taxonomy is fatal to the process; every fault is
/// scoped to the single request that triggered it.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The collaborator rejected an argument as malformed.
    #[error("Illegal argument: {message}")]
    IllegalArgument {
        /// Description of the rejected argument.
        message: String,
    },

    /// The resource-owner credential could not be verified.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Description of the failure. Never forwarded to callers.
        message: String,
    },

    /// An error occurred while reading from the backing store.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a new `IllegalArgument` error.
    #[must_use]
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::IllegalArgument {
            message: message.into(),
        }
    }

    /// Creates a new `AuthenticationFailed` error.
    #[must_use]
    pub fn authentication_failed(message: impl Into<String>) -> Self {
        Self::AuthenticationFailed {
            message: message.into(),
        }
    }

    /// Creates a new `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this fault originated in the infrastructure
    /// rather than in the request itself.
    #[must_use]
    pub fn is_infrastructure_error(&self) -> bool {
        matches!(self, Self::Storage { .. } | Self::Internal { .. })
    }
}
