//! # ddl
//!
//! Deterministic DDL compiler for Materialize objects.
//!
//! The crate has two layers:
//!
//! - **Resolution**: raw operator blocks ([`KafkaConnectionSpec`],
//!   [`SecretSpec`], [`SecretGrantSpec`]) carry optional and mutually
//!   exclusive fields. `resolve()` turns each into exactly one concrete
//!   representation or fails with [`Error::ConfigurationConflict`] /
//!   [`Error::InvalidDescriptor`].
//! - **Compilation**: resolved values implement [`Statements`], a set of
//!   pure functions producing `CREATE`, `ALTER ... RENAME TO`, `DROP` and
//!   the catalog id lookup.
//!
//! Nothing here performs I/O.
//!
//! ## Example
//!
//! ```
//! use ddl::{KafkaBrokerSpec, KafkaConnectionSpec, ObjectReference, Statements, ValueSecretSpec};
//!
//! let spec = KafkaConnectionSpec {
//!     kafka_broker: vec![KafkaBrokerSpec::new("b1:9092")],
//!     sasl_mechanisms: Some("PLAIN".into()),
//!     sasl_username: Some(ValueSecretSpec::text("u")),
//!     sasl_password: Some(ObjectReference::new("pw_secret")),
//!     ..KafkaConnectionSpec::new("k1")
//! };
//!
//! let conn = spec.resolve()?;
//! assert_eq!(
//!     conn.create_sql(),
//!     "CREATE CONNECTION k1 TO KAFKA (BROKERS ('b1:9092'), SASL MECHANISMS = 'PLAIN', \
//!      SASL USERNAME = 'u', SASL PASSWORD = SECRET pw_secret);"
//! );
//! assert_eq!(conn.drop_sql(), "DROP CONNECTION k1;");
//! # Ok::<(), ddl::Error>(())
//! ```

pub mod catalog;
pub mod error;
pub mod kafka;
pub mod name;
pub mod privilege;
pub mod quote;
pub mod secret;
pub mod statement;
pub mod value;

pub use error::{Error, Result};
pub use kafka::{
    AwsPrivateLink, AwsPrivateLinkSpec, BrokerRouting, KafkaBroker, KafkaBrokerSpec,
    KafkaConnection, KafkaConnectionSpec, SASL_MECHANISMS, SECURITY_PROTOCOLS,
};
pub use name::{ObjectDescriptor, ObjectKind, ObjectReference, qualified_name};
pub use privilege::{PRIVILEGES, Privilege, PrivilegeGrant, SecretGrantSpec};
pub use quote::{quote_identifier, quote_string};
pub use secret::{Secret, SecretSpec};
pub use statement::{Statements, alter_owner, comment_on, drop_object, rename_object};
pub use value::{SecretValue, ValueSecretSpec};
