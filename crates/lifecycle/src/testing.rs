//! Scripted in-memory store for tests

use crate::context::Cancellation;
use crate::executor::{Executor, Row, StoreError};
use std::cell::RefCell;

/// Store that answers statements by substring rules and records every
/// statement it receives. The first matching rule wins; unmatched
/// statements succeed with no rows.
#[derive(Default)]
pub struct ScriptedStore {
    executed: RefCell<Vec<String>>,
    failures: Vec<(String, StoreError)>,
    responses: Vec<(String, Vec<Row>)>,
    cancel_after: Option<(String, Cancellation)>,
}

/// Text rows; an empty string stands for NULL
pub fn rows(values: &[&[&str]]) -> Vec<Row> {
    values
        .iter()
        .map(|row| {
            row.iter()
                .map(|v| Some((*v).to_string()).filter(|v| !v.is_empty()))
                .collect()
        })
        .collect()
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, needle: &str, rows: Vec<Row>) -> Self {
        self.responses.push((needle.to_string(), rows));
        self
    }

    pub fn fail(mut self, needle: &str, error: StoreError) -> Self {
        self.failures.push((needle.to_string(), error));
        self
    }

    /// Trip `cancellation` once a matching statement has run
    pub fn cancel_after(mut self, needle: &str, cancellation: &Cancellation) -> Self {
        self.cancel_after = Some((needle.to_string(), cancellation.clone()));
        self
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.borrow().clone()
    }

    pub fn count(&self, needle: &str) -> usize {
        self.executed
            .borrow()
            .iter()
            .filter(|sql| sql.contains(needle))
            .count()
    }
}

impl Executor for ScriptedStore {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
        self.executed.borrow_mut().push(sql.to_string());

        if let Some((needle, cancellation)) = &self.cancel_after
            && sql.contains(needle.as_str())
        {
            cancellation.cancel();
        }

        if let Some((_, error)) = self.failures.iter().find(|(n, _)| sql.contains(n.as_str())) {
            return Err(error.clone());
        }

        Ok(self
            .responses
            .iter()
            .find(|(n, _)| sql.contains(n.as_str()))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default())
    }
}
