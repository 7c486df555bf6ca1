//! Error types for the CAS client core.
//!
//! This module defines all error types that can occur during ticket
//! validation, logout processing, and proxy-granting-ticket storage.

/// Errors that can occur during CAS client operations.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// The authentication server rejected the ticket.
    ///
    /// This is a terminal, user-visible authentication failure for the
    /// request. Tickets are single-use, so the validation is never retried.
    #[error("Ticket validation failed: {code} - {message}")]
    ValidationFailure {
        /// Failure code reported by the authentication server.
        code: String,
        /// Description of why validation failed.
        message: String,
    },

    /// A logout payload carried no recognizable session index.
    #[error("Malformed logout message: {message}")]
    MalformedLogoutMessage {
        /// Description of what was wrong with the payload.
        message: String,
    },

    /// The client configuration is invalid.
    ///
    /// Surfaced at startup, never deferred to first use.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// An internal cross-map invariant was violated.
    ///
    /// Must never occur under correct use; callers treat the affected
    /// entry as "not found".
    #[error("Store inconsistency: {message}")]
    StoreInconsistency {
        /// Description of the violated invariant.
        message: String,
    },

    /// A storage backend failed.
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

impl CasError {
    /// Creates a new `ValidationFailure` error.
    #[must_use]
    pub fn validation_failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationFailure {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Creates a new `MalformedLogoutMessage` error.
    #[must_use]
    pub fn malformed_logout_message(message: impl Into<String>) -> Self {
        Self::MalformedLogoutMessage {
            message: message.into(),
        }
    }

    /// Creates a new `Configuration` error.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a new `StoreInconsistency` error.
    #[must_use]
    pub fn store_inconsistency(message: impl Into<String>) -> Self {
        Self::StoreInconsistency {
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

    /// Returns `true` if this error should be shown to the end user.
    ///
    /// Validation failures are user-visible (the caller typically
    /// re-authenticates or shows an error page); everything else is an
    /// operational concern.
    #[must_use]
    pub fn is_user_visible(&self) -> bool {
        matches!(self, Self::ValidationFailure { .. })
    }

    /// Returns `true` if this error is fatal at startup.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Configuration { .. })
    }
}
