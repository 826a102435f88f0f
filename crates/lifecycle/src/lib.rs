//! # Lifecycle
//!
//! Drives Materialize objects described with [`ddl`] through the store.
//!
//! ## Core Concepts
//!
//! - **Executor**: runs one statement and returns text rows; the only I/O seam
//! - **CreationSaga**: create, set owner, comment, resolve id, with a single
//!   compensating drop when a step after the create fails
//! - **PersistedIdentity**: the `region:id` string kept by callers
//! - **GrantKey**: `region:GRANT|<KIND>|<object id>|<role id>|<PRIVILEGE>`
//!
//! ## Example
//!
//! ```
//! use ddl::{KafkaBrokerSpec, KafkaConnectionSpec};
//! use lifecycle::{Desired, Executor, Orchestrator, Row, StoreError};
//!
//! /// Accepts every statement and answers lookups with id `u1`
//! struct Store;
//!
//! impl Executor for Store {
//!     fn execute(&self, sql: &str) -> Result<Vec<Row>, StoreError> {
//!         if sql.starts_with("SELECT") {
//!             return Ok(vec![vec![Some("u1".to_string())]]);
//!         }
//!         Ok(Vec::new())
//!     }
//! }
//!
//! let conn = KafkaConnectionSpec {
//!     kafka_broker: vec![KafkaBrokerSpec::new("b1:9092")],
//!     ..KafkaConnectionSpec::new("k1")
//! }
//! .resolve()?;
//!
//! let orchestrator = Orchestrator::new(&Store, "aws/us-east-1");
//! let id = orchestrator.create(&Desired::new(conn).owned_by("analysts"))?;
//! assert_eq!(id.encode(), "aws/us-east-1:u1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Failure handling
//!
//! Nothing is retried. A failed create leaves nothing behind. A failed
//! ownership or comment step drops the object once and reports the original
//! error; if that drop fails too, [`Error::CompensationFailed`] carries both.

pub mod context;
pub mod error;
pub mod executor;
pub mod grant;
pub mod identity;
pub mod orchestrator;
pub mod saga;
pub mod types;

#[cfg(test)]
mod testing;

pub use context::{Cancellation, NoObserver, TransitionLog, TransitionObserver};
pub use error::{Error, Result};
pub use executor::{Executor, Row, StoreError, StoreErrorKind};
pub use grant::GrantKey;
pub use identity::{ObservedObject, PersistedIdentity};
pub use orchestrator::Orchestrator;
pub use saga::{CreationSaga, FailurePolicy, LifecycleState, SagaStep, Step, UpdatePlan};
pub use types::{Desired, UpdateReport};
