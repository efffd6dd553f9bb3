//! Error types for the XA harness
//!
//! This module defines the error kinds that flow through both roles.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Every layer returns an [`XaError`] rather than a bare success flag so the
//! diagnostic survives up to the scenario boundary, where it is recorded as a
//! failed assertion.

use crate::tm_error::TmError;
use thiserror::Error;

/// Result type alias for harness operations
pub type XaResult<T> = std::result::Result<T, XaError>;

/// Error kinds for the XA harness
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XaError {
    /// Wire message could not be decoded into `<key>:<payload>`
    #[error("Malformed request {message:?}: {reason}")]
    MalformedRequest {
        /// The offending message, lossily decoded
        message: String,
        /// Why decoding failed
        reason: String,
    },

    /// Read or write failure surfaced by the storage engine
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the failure
        message: String,
    },

    /// begin/commit/abort/call failure reported by the transaction manager
    #[error("Transaction error: {0}")]
    Transaction(#[from] TmError),

    /// A verification step found unexpected state
    #[error("Assertion failed: {tag}")]
    AssertionFailed {
        /// Assertion tag naming the check
        tag: String,
    },

    /// Table creation or teardown failed; fatal for the run
    #[error("Setup failed: {message}")]
    SetupFailed {
        /// Description of the failure
        message: String,
    },

    /// Configuration could not be loaded or parsed
    #[error("Invalid configuration: {message}")]
    Config {
        /// Description of the failure
        message: String,
    },
}

impl XaError {
    /// Build a `MalformedRequest` error
    pub fn malformed(message: impl Into<String>, reason: impl Into<String>) -> Self {
        XaError::MalformedRequest {
            message: message.into(),
            reason: reason.into(),
        }
    }

    /// Build a `Storage` error
    pub fn storage(message: impl Into<String>) -> Self {
        XaError::Storage {
            message: message.into(),
        }
    }

    /// Build an `AssertionFailed` error
    pub fn assertion(tag: impl Into<String>) -> Self {
        XaError::AssertionFailed { tag: tag.into() }
    }

    /// Build a `SetupFailed` error
    pub fn setup(message: impl Into<String>) -> Self {
        XaError::SetupFailed {
            message: message.into(),
        }
    }

    /// Build a `Config` error
    pub fn config(message: impl Into<String>) -> Self {
        XaError::Config {
            message: message.into(),
        }
    }

    /// True for errors that must stop the whole run
    pub fn is_fatal(&self) -> bool {
        matches!(self, XaError::SetupFailed { .. })
    }

    /// The transaction-manager error, if this is one
    pub fn as_tm_error(&self) -> Option<&TmError> {
        match self {
            XaError::Transaction(e) => Some(e),
            _ => None,
        }
    }
}
