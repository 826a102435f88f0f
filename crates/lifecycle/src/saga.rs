//! Creation and update sequences as plain values
//!
//! A [`CreationSaga`] is built before anything touches the store: the
//! ordered steps, the state each one enters, what a failure of each one
//! means, and the single compensating drop. The orchestrator only walks it.

use crate::error::{Error, Result};
use crate::identity::ObservedObject;
use crate::types::Desired;
use ddl::{ObjectDescriptor, Statements, alter_owner, comment_on, rename_object};
use std::fmt;

/// Where an object is in its creation sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Absent,
    Creating,
    OwnershipPending,
    CommentPending,
    Ready,
    Dropped,
    Failed,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Absent => "absent",
            Self::Creating => "creating",
            Self::OwnershipPending => "ownership-pending",
            Self::CommentPending => "comment-pending",
            Self::Ready => "ready",
            Self::Dropped => "dropped",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// What a failed step leaves behind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Nothing was created; report the error as is
    Surface,
    /// The object exists; drop it before reporting
    Compensate,
}

/// One statement with a label that is safe to log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Step kind and object, e.g. `create CONNECTION k1`
    pub label: String,
    pub sql: String,
    /// Statement with sensitive literals masked
    pub display_sql: String,
}

impl Step {
    fn new(label: String, sql: String) -> Self {
        Self {
            label,
            display_sql: sql.clone(),
            sql,
        }
    }
}

/// A step of the creation sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SagaStep {
    pub step: Step,
    /// State entered when this step is issued
    pub enters: LifecycleState,
    pub on_failure: FailurePolicy,
}

/// Create, then ownership, then comment, then identity lookup.
///
/// Ownership and comment steps are present only when configured.
#[derive(Debug, Clone)]
pub struct CreationSaga {
    object: ObjectDescriptor,
    steps: Vec<SagaStep>,
    identity: Step,
    compensation: Step,
}

impl CreationSaga {
    pub fn new<S: Statements>(desired: &Desired<S>) -> Result<Self> {
        let object = desired.object.object().clone();
        let label = object.label();

        let mut steps = vec![SagaStep {
            step: Step {
                label: format!("create {label}"),
                sql: desired.object.create_sql(),
                display_sql: desired.object.display_create_sql(),
            },
            enters: LifecycleState::Creating,
            on_failure: FailurePolicy::Surface,
        }];

        if let Some(role) = desired.ownership_role() {
            steps.push(SagaStep {
                step: Step::new(format!("set owner of {label}"), alter_owner(&object, role)?),
                enters: LifecycleState::OwnershipPending,
                on_failure: FailurePolicy::Compensate,
            });
        }

        if let Some(comment) = desired.comment() {
            steps.push(SagaStep {
                step: Step::new(format!("comment on {label}"), comment_on(&object, Some(comment))),
                enters: LifecycleState::CommentPending,
                on_failure: FailurePolicy::Compensate,
            });
        }

        Ok(Self {
            identity: Step::new(format!("resolve id of {label}"), desired.object.read_id_sql()),
            compensation: Step::new(format!("drop {label}"), desired.object.drop_sql()),
            object,
            steps,
        })
    }

    pub fn object(&self) -> &ObjectDescriptor {
        &self.object
    }

    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Lookup run after the last step; its failure is surfaced
    pub fn identity(&self) -> &Step {
        &self.identity
    }

    /// Undo for everything after the create step
    pub fn compensation(&self) -> &Step {
        &self.compensation
    }

    /// Every statement in issue order, masked, for previews
    pub fn display(&self) -> Vec<String> {
        self.steps
            .iter()
            .map(|s| s.step.display_sql.clone())
            .chain(std::iter::once(self.identity.display_sql.clone()))
            .collect()
    }
}

/// Statements that bring an existing object in line with its description
#[derive(Debug, Clone, Default)]
pub struct UpdatePlan {
    steps: Vec<Step>,
}

impl UpdatePlan {
    /// Compare the description with what the store reports.
    ///
    /// Every reason to replace instead of alter is checked before any step
    /// is planned, so a rejected update issues nothing. Steps are ordered
    /// rename, definition, owner, comment; everything after the rename
    /// targets the new name.
    pub fn new<S: Statements>(
        desired: &Desired<S>,
        observed: &ObservedObject,
        content_changed: bool,
    ) -> Result<Self> {
        let wanted = desired.object.object();
        let current = &observed.descriptor;

        let replace = |field| Error::RequiresReplacement {
            object: current.label(),
            field,
        };
        if wanted.kind() != current.kind() {
            return Err(replace("kind"));
        }
        if !wanted.schema_name().is_empty() && wanted.schema_name() != current.schema_name() {
            return Err(replace("schema_name"));
        }
        if !wanted.database_name().is_empty() && wanted.database_name() != current.database_name() {
            return Err(replace("database_name"));
        }
        let alter = if content_changed {
            let sql = desired.object.alter_sql().ok_or_else(|| replace("definition"))?;
            let display_sql = desired.object.display_alter_sql().unwrap_or_else(|| sql.clone());
            Some((sql, display_sql))
        } else {
            None
        };

        let mut steps = Vec::new();
        let target = if wanted.name() == current.name() {
            current.clone()
        } else {
            steps.push(Step::new(
                format!("rename {}", current.label()),
                rename_object(current, wanted.name())?,
            ));
            current.renamed(wanted.name())?
        };
        let label = target.label();

        if let Some((sql, display_sql)) = alter {
            steps.push(Step {
                label: format!("alter {label}"),
                sql,
                display_sql,
            });
        }

        if let Some(role) = desired.ownership_role()
            && role != observed.owner_name
        {
            steps.push(Step::new(format!("set owner of {label}"), alter_owner(&target, role)?));
        }

        if desired.comment() != observed.comment.as_deref() {
            steps.push(Step::new(
                format!("comment on {label}"),
                comment_on(&target, desired.comment()),
            ));
        }

        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}
