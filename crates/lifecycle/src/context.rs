//! Cancellation and transition observers
//!
//! These let callers stop an operation between statements and follow its
//! state transitions without the orchestrator depending on any UI.

use crate::saga::LifecycleState;
use ddl::ObjectDescriptor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Cooperative cancellation flag shared between caller and orchestrator.
///
/// Checked before each statement is issued, never mid-statement.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Receives every lifecycle state transition of a creation sequence
pub trait TransitionObserver {
    fn on_transition(
        &mut self,
        object: &ObjectDescriptor,
        from: LifecycleState,
        to: LifecycleState,
    );
}

/// Observer that ignores transitions
pub struct NoObserver;

impl TransitionObserver for NoObserver {
    fn on_transition(
        &mut self,
        _object: &ObjectDescriptor,
        _from: LifecycleState,
        _to: LifecycleState,
    ) {
    }
}

/// Observer that records transitions in order
#[derive(Debug, Default)]
pub struct TransitionLog {
    pub transitions: Vec<(LifecycleState, LifecycleState)>,
}

impl TransitionObserver for TransitionLog {
    fn on_transition(
        &mut self,
        _object: &ObjectDescriptor,
        from: LifecycleState,
        to: LifecycleState,
    ) {
        self.transitions.push((from, to));
    }
}

impl TransitionLog {
    /// Final state reached, `Absent` if nothing happened
    pub fn last_state(&self) -> LifecycleState {
        self.transitions
            .last()
            .map_or(LifecycleState::Absent, |(_, to)| *to)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancellation_is_shared() {
        let a = Cancellation::new();
        let b = a.clone();
        assert!(!b.is_cancelled());
        a.cancel();
        assert!(b.is_cancelled());
    }

    #[test]
    fn test_transition_log_last_state() {
        let mut log = TransitionLog::default();
        assert_eq!(log.last_state(), LifecycleState::Absent);
        log.transitions
            .push((LifecycleState::Absent, LifecycleState::Creating));
        assert_eq!(log.last_state(), LifecycleState::Creating);
    }
}
