//! Error types for lifecycle operations

use crate::executor::{StoreError, StoreErrorKind};
use thiserror::Error;

/// Errors that can occur while driving an object's lifecycle
#[derive(Error, Debug)]
pub enum Error {
    /// The description could not be resolved or compiled
    #[error(transparent)]
    Descriptor(#[from] ddl::Error),

    /// The store rejected a statement. `step` names the statement by kind
    /// and object, never by its text.
    #[error("{step} failed: {source}")]
    Execution {
        step: String,
        #[source]
        source: StoreError,
    },

    /// A lookup expected one row and found none
    #[error("{what} not found")]
    NotFound { what: String },

    /// A lookup expected one row and found several
    #[error("{what} matched {rows} rows, expected exactly one")]
    AmbiguousIdentity { what: String, rows: usize },

    /// A persisted identity or grant key could not be parsed
    #[error("malformed identity '{value}': {reason}")]
    MalformedIdentity { value: String, reason: &'static str },

    /// The caller cancelled before the named step was issued
    #[error("cancelled before {step}")]
    Cancelled { step: String },

    /// The change cannot be applied to the existing object
    #[error("{object} cannot change {field} in place and must be replaced")]
    RequiresReplacement { object: String, field: &'static str },

    /// A post-create step failed and so did the compensating drop
    #[error("{original}; compensating drop of {object} also failed: {compensation}")]
    CompensationFailed {
        object: String,
        original: Box<Error>,
        compensation: Box<Error>,
    },
}

impl Error {
    pub(crate) fn malformed(value: impl Into<String>, reason: &'static str) -> Self {
        Self::MalformedIdentity {
            value: value.into(),
            reason,
        }
    }

    /// Whether a lookup came back empty
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Whether the store reported the target object as unknown
    pub fn is_unknown_object(&self) -> bool {
        matches!(
            self,
            Self::Execution { source, .. } if source.kind == StoreErrorKind::UnknownObject
        )
    }
}

/// Result type for lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;
