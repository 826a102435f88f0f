//! Core types for lifecycle operations

use ddl::Statements;

/// Desired state of one object: its compiled description plus the
/// attributes applied after creation.
#[derive(Debug, Clone)]
pub struct Desired<S> {
    pub object: S,
    /// Role that should own the object
    pub ownership_role: Option<String>,
    /// Comment attached to the object
    pub comment: Option<String>,
}

impl<S: Statements> Desired<S> {
    pub fn new(object: S) -> Self {
        Self {
            object,
            ownership_role: None,
            comment: None,
        }
    }

    #[must_use]
    pub fn owned_by(mut self, role: impl Into<String>) -> Self {
        self.ownership_role = Some(role.into());
        self
    }

    #[must_use]
    pub fn commented(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Ownership role, empty treated as unset
    pub fn ownership_role(&self) -> Option<&str> {
        self.ownership_role.as_deref().filter(|r| !r.is_empty())
    }

    /// Comment, empty treated as unset
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref().filter(|c| !c.is_empty())
    }
}

/// Statements an update actually issued, by step label
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateReport {
    pub applied: Vec<String>,
}

impl UpdateReport {
    /// Whether the object already matched
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}
