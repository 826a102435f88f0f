//! Error types for the ddl crate

use thiserror::Error;

/// Errors raised while resolving or compiling an object description.
///
/// Both variants are caller errors: they are reported before any statement
/// reaches the store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The description breaks a builder invariant (empty name, unknown
    /// enumerated value, missing required companion field)
    #[error("invalid descriptor: {reason}")]
    InvalidDescriptor { reason: String },

    /// Two mutually exclusive inputs were populated together
    #[error("conflicting configuration for {field}: {reason}")]
    ConfigurationConflict { field: String, reason: String },
}

impl Error {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            reason: reason.into(),
        }
    }

    pub(crate) fn conflict(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ConfigurationConflict {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for ddl operations
pub type Result<T> = std::result::Result<T, Error>;
