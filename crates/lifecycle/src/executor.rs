//! Statement execution seam
//!
//! The orchestrator never opens connections itself. Callers hand it an
//! [`Executor`] that runs one statement at a time and returns the result
//! rows as text columns.

use thiserror::Error;

/// One result row, each column as text; `None` is SQL NULL
pub type Row = Vec<Option<String>>;

/// Broad classification of a store failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The statement referenced an object the store does not know
    UnknownObject,
    /// The store rejected the statement for any other reason
    Rejected,
    /// The statement never reached the store
    Transport,
}

/// Error returned by an [`Executor`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unknown_object(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::UnknownObject, message)
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Rejected, message)
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Transport, message)
    }
}

/// Runs a single SQL statement against the store.
///
/// Implementations must not retry: every error is final for the attempt.
pub trait Executor {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError>;
}

impl<E: Executor + ?Sized> Executor for &E {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        (**self).execute(sql)
    }
}

impl<E: Executor + ?Sized> Executor for Box<E> {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        (**self).execute(sql)
    }
}
