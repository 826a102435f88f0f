//! Create, read, update and delete against the store

use crate::context::{Cancellation, NoObserver, TransitionObserver};
use crate::error::{Error, Result};
use crate::executor::{Executor, Row, StoreErrorKind};
use crate::identity::{ObservedObject, PersistedIdentity, exactly_one, id_column};
use crate::saga::{CreationSaga, FailurePolicy, LifecycleState, UpdatePlan};
use crate::types::{Desired, UpdateReport};
use ddl::catalog;
use ddl::{ObjectDescriptor, ObjectKind, Statements, drop_object};

/// Drives object lifecycles through one [`Executor`] for one region.
///
/// Every operation issues statements strictly one after another and never
/// retries. Cancellation is checked before each statement.
pub struct Orchestrator<'a, E: Executor + ?Sized> {
    executor: &'a E,
    region: String,
    cancellation: Cancellation,
}

fn advance<O: TransitionObserver + ?Sized>(
    observer: &mut O,
    object: &ObjectDescriptor,
    state: &mut LifecycleState,
    to: LifecycleState,
) {
    log::debug!("{}: {} -> {}", object.label(), state, to);
    observer.on_transition(object, *state, to);
    *state = to;
}

impl<'a, E: Executor + ?Sized> Orchestrator<'a, E> {
    pub fn new(executor: &'a E, region: impl Into<String>) -> Self {
        Self {
            executor,
            region: region.into(),
            cancellation: Cancellation::new(),
        }
    }

    #[must_use]
    pub fn with_cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    /// Issue one statement unless cancelled. `step` is what errors and logs
    /// show; the statement text is never included.
    pub(crate) fn execute(&self, step: &str, sql: &str) -> Result<Vec<Row>> {
        if self.cancellation.is_cancelled() {
            return Err(Error::Cancelled {
                step: step.to_string(),
            });
        }
        log::trace!("{step}");
        self.executor.execute(sql).map_err(|source| Error::Execution {
            step: step.to_string(),
            source,
        })
    }

    /// Create an object and return its persisted identity.
    pub fn create<S: Statements>(&self, desired: &Desired<S>) -> Result<PersistedIdentity> {
        self.create_observed(desired, &mut NoObserver)
    }

    /// [`Self::create`], reporting every state transition to `observer`.
    pub fn create_observed<S, O>(
        &self,
        desired: &Desired<S>,
        observer: &mut O,
    ) -> Result<PersistedIdentity>
    where
        S: Statements,
        O: TransitionObserver + ?Sized,
    {
        let saga = CreationSaga::new(desired)?;
        self.run_saga(&saga, observer)
    }

    pub fn run_saga<O: TransitionObserver + ?Sized>(
        &self,
        saga: &CreationSaga,
        observer: &mut O,
    ) -> Result<PersistedIdentity> {
        let object = saga.object();
        let mut state = LifecycleState::Absent;

        for step in saga.steps() {
            advance(observer, object, &mut state, step.enters);
            if let Err(err) = self.execute(&step.step.label, &step.step.sql) {
                return Err(match step.on_failure {
                    FailurePolicy::Surface => {
                        advance(observer, object, &mut state, LifecycleState::Failed);
                        err
                    }
                    FailurePolicy::Compensate => self.compensate(saga, err, observer, &mut state),
                });
            }
        }

        let lookup = saga.identity();
        let resolved = match self.execute(&lookup.label, &lookup.sql) {
            Err(err @ Error::Cancelled { .. }) => {
                return Err(self.compensate(saga, err, observer, &mut state));
            }
            rows => rows
                .and_then(|rows| exactly_one(&object.label(), rows))
                .and_then(|row| id_column(&object.label(), row))
                .and_then(|id| PersistedIdentity::new(self.region.as_str(), id)),
        };

        match resolved {
            Ok(identity) => {
                advance(observer, object, &mut state, LifecycleState::Ready);
                log::info!("created {} as {identity}", object.label());
                Ok(identity)
            }
            Err(err) => {
                log::warn!("{} was created but its id could not be resolved", object.label());
                advance(observer, object, &mut state, LifecycleState::Failed);
                Err(err)
            }
        }
    }

    /// Run the saga's drop once, bypassing cancellation, and return the
    /// error to surface.
    fn compensate<O: TransitionObserver + ?Sized>(
        &self,
        saga: &CreationSaga,
        original: Error,
        observer: &mut O,
        state: &mut LifecycleState,
    ) -> Error {
        let object = saga.object();
        let drop = saga.compensation();
        log::warn!("{original}; dropping {}", object.label());

        match self.executor.execute(&drop.sql) {
            Ok(_) => {
                advance(observer, object, state, LifecycleState::Dropped);
                original
            }
            Err(source) if source.kind == StoreErrorKind::UnknownObject => {
                advance(observer, object, state, LifecycleState::Dropped);
                original
            }
            Err(source) => {
                advance(observer, object, state, LifecycleState::Failed);
                let compensation = Error::Execution {
                    step: drop.label.clone(),
                    source,
                };
                log::error!(
                    "{} was left behind and needs manual intervention: {compensation}",
                    object.label()
                );
                Error::CompensationFailed {
                    object: object.label(),
                    original: Box::new(original),
                    compensation: Box::new(compensation),
                }
            }
        }
    }

    /// Current state of the object with `identity`; `NotFound` means it
    /// was removed outside this tool.
    pub fn read(&self, kind: ObjectKind, identity: &PersistedIdentity) -> Result<ObservedObject> {
        if identity.region() != self.region {
            log::warn!(
                "{identity} belongs to region '{}' but this store is '{}'",
                identity.region(),
                self.region
            );
        }
        let what = format!("{kind} {identity}");
        let sql = catalog::read_object(kind, identity.id());
        let rows = self.execute(&format!("read {what}"), &sql)?;
        ObservedObject::from_row(kind, exactly_one(&what, rows)?)
    }

    /// Bring an existing object in line with `desired`.
    ///
    /// `content_changed` says whether the definition itself differs from
    /// what was last applied. Nothing is issued when the change needs a
    /// replacement.
    pub fn update<S: Statements>(
        &self,
        desired: &Desired<S>,
        identity: &PersistedIdentity,
        content_changed: bool,
    ) -> Result<UpdateReport> {
        let observed = self.read(desired.object.object().kind(), identity)?;
        let plan = UpdatePlan::new(desired, &observed, content_changed)?;

        let mut report = UpdateReport::default();
        for step in plan.steps() {
            self.execute(&step.label, &step.sql)?;
            report.applied.push(step.label.clone());
        }
        if report.is_noop() {
            log::debug!("{} already up to date", observed.descriptor.label());
        }
        Ok(report)
    }

    /// Drop the object with `identity`. An object that is already gone
    /// counts as deleted.
    pub fn delete(&self, kind: ObjectKind, identity: &PersistedIdentity) -> Result<()> {
        let observed = match self.read(kind, identity) {
            Err(err) if err.is_not_found() => {
                log::info!("{kind} {identity} already removed");
                return Ok(());
            }
            observed => observed?,
        };

        let label = observed.descriptor.label();
        match self.execute(&format!("drop {label}"), &drop_object(&observed.descriptor)) {
            Err(err) if err.is_unknown_object() => {
                log::info!("{label} already removed");
                Ok(())
            }
            result => result.map(|_| ()),
        }
    }

    /// Store-assigned id of an object by name
    pub fn object_id(&self, object: &ObjectDescriptor) -> Result<String> {
        let what = object.label();
        let rows = self.execute(&format!("resolve id of {what}"), &catalog::read_id(object))?;
        id_column(&what, exactly_one(&what, rows)?)
    }

    /// Store-assigned id of a role by name
    pub fn role_id(&self, role: &str) -> Result<String> {
        let what = format!("ROLE {role}");
        let rows = self.execute(&format!("resolve id of {what}"), &catalog::read_role_id(role))?;
        id_column(&what, exactly_one(&what, rows)?)
    }
}
