//! Persisted identities and catalog lookups
//!
//! A created object is remembered as `region:id`, the store-assigned id
//! qualified by the region whose store holds it. The string is the durable
//! handle for every later read, update and delete.

use crate::error::{Error, Result};
use crate::executor::Row;
use ddl::catalog::OBJECT_COLUMNS;
use ddl::{ObjectDescriptor, ObjectKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separator between region and id
pub const SEPARATOR: char = ':';

/// Region-qualified store id of an object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersistedIdentity {
    region: String,
    id: String,
}

impl PersistedIdentity {
    /// Region must be non-empty and free of the separator; id must be non-empty.
    pub fn new(region: impl Into<String>, id: impl Into<String>) -> Result<Self> {
        let region = region.into();
        let id = id.into();
        if region.is_empty() {
            return Err(Error::malformed(format!("{region}{SEPARATOR}{id}"), "empty region"));
        }
        if region.contains(SEPARATOR) {
            return Err(Error::malformed(region, "region contains the separator"));
        }
        if id.is_empty() {
            return Err(Error::malformed(format!("{region}{SEPARATOR}"), "empty id"));
        }
        Ok(Self { region, id })
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn encode(&self) -> String {
        format!("{}{SEPARATOR}{}", self.region, self.id)
    }

    /// Split on the first separator.
    pub fn decode(value: &str) -> Result<Self> {
        let (region, id) = value
            .split_once(SEPARATOR)
            .ok_or_else(|| Error::malformed(value, "missing region separator"))?;
        if region.is_empty() || id.is_empty() {
            return Err(Error::malformed(value, "empty region or id"));
        }
        Ok(Self {
            region: region.to_string(),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for PersistedIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{SEPARATOR}{}", self.region, self.id)
    }
}

impl FromStr for PersistedIdentity {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for PersistedIdentity {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::decode(&value)
    }
}

impl From<PersistedIdentity> for String {
    fn from(identity: PersistedIdentity) -> Self {
        identity.encode()
    }
}

/// The single row a lookup must return.
pub fn exactly_one(what: &str, rows: Vec<Row>) -> Result<Row> {
    let count = rows.len();
    let mut rows = rows.into_iter();
    match (rows.next(), count) {
        (None, _) => Err(Error::NotFound {
            what: what.to_string(),
        }),
        (Some(row), 1) => Ok(row),
        (Some(_), rows) => Err(Error::AmbiguousIdentity {
            what: what.to_string(),
            rows,
        }),
    }
}

/// First column of a lookup row, which must be a non-empty id.
pub fn id_column(what: &str, row: Row) -> Result<String> {
    row.into_iter()
        .next()
        .flatten()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::malformed(what, "lookup returned an empty id"))
}

/// An object as the store currently reports it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObservedObject {
    pub id: String,
    pub descriptor: ObjectDescriptor,
    pub owner_name: String,
    pub comment: Option<String>,
}

impl ObservedObject {
    /// Build from a [`ddl::catalog::read_object`] row.
    ///
    /// A NULL database means the schema lives outside any database. A NULL
    /// comment means none is set; an empty one is kept as set.
    pub fn from_row(kind: ObjectKind, row: Row) -> Result<Self> {
        let columns: [Option<String>; OBJECT_COLUMNS.len()] =
            row.try_into().map_err(|row: Row| {
                log::debug!(
                    "catalog row for {kind} has {} columns, expected {}",
                    row.len(),
                    OBJECT_COLUMNS.len()
                );
                Error::malformed(kind.keyword(), "catalog row has the wrong number of columns")
            })?;
        let [id, name, schema_name, database_name, owner_name, comment] = columns;
        let required = |column: Option<String>, reason: &'static str| {
            column.ok_or_else(|| Error::malformed(kind.keyword(), reason))
        };

        Ok(Self {
            descriptor: ObjectDescriptor::new(
                kind,
                required(name, "catalog row has no name")?,
                required(schema_name, "catalog row has no schema")?,
                database_name.unwrap_or_default(),
            )?,
            id: required(id, "catalog row has no id")?,
            owner_name: required(owner_name, "catalog row has no owner")?,
            comment,
        })
    }
}
