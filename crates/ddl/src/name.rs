//! Object kinds, qualified names and object references

use crate::error::{Error, Result};
use crate::quote::quote_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a schema-scoped database object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectKind {
    #[serde(rename = "CONNECTION")]
    Connection,
    #[serde(rename = "SECRET")]
    Secret,
    #[serde(rename = "TABLE")]
    Table,
    #[serde(rename = "VIEW")]
    View,
    #[serde(rename = "MATERIALIZED VIEW")]
    MaterializedView,
    #[serde(rename = "SOURCE")]
    Source,
    #[serde(rename = "SINK")]
    Sink,
    #[serde(rename = "TYPE")]
    Type,
}

impl ObjectKind {
    /// All kinds, in catalog order
    pub const ALL: [ObjectKind; 8] = [
        Self::Connection,
        Self::Secret,
        Self::Table,
        Self::View,
        Self::MaterializedView,
        Self::Source,
        Self::Sink,
        Self::Type,
    ];

    /// SQL keyword used in DDL (`CREATE <keyword> ...`)
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Connection => "CONNECTION",
            Self::Secret => "SECRET",
            Self::Table => "TABLE",
            Self::View => "VIEW",
            Self::MaterializedView => "MATERIALIZED VIEW",
            Self::Source => "SOURCE",
            Self::Sink => "SINK",
            Self::Type => "TYPE",
        }
    }

    /// Catalog relation listing objects of this kind
    pub fn catalog_relation(&self) -> &'static str {
        match self {
            Self::Connection => "mz_connections",
            Self::Secret => "mz_secrets",
            Self::Table => "mz_tables",
            Self::View => "mz_views",
            Self::MaterializedView => "mz_materialized_views",
            Self::Source => "mz_sources",
            Self::Sink => "mz_sinks",
            Self::Type => "mz_types",
        }
    }

    /// Object type as recorded in `mz_internal.mz_comments`
    pub fn comment_object_type(&self) -> &'static str {
        match self {
            Self::Connection => "connection",
            Self::Secret => "secret",
            Self::Table => "table",
            Self::View => "view",
            Self::MaterializedView => "materialized-view",
            Self::Source => "source",
            Self::Sink => "sink",
            Self::Type => "type",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_uppercase().replace('_', " ");
        Self::ALL
            .into_iter()
            .find(|kind| kind.keyword() == wanted)
            .ok_or_else(|| Error::invalid(format!("unknown object kind '{s}'")))
    }
}

/// Render `database.schema.name`, skipping empty scopes.
///
/// Callers guarantee that a database is never given without a schema.
pub fn qualified_name(database: &str, schema: &str, name: &str) -> String {
    [database, schema, name]
        .iter()
        .filter(|part| !part.is_empty())
        .map(|part| quote_identifier(part))
        .collect::<Vec<_>>()
        .join(".")
}

fn check_scope(what: &str, name: &str, schema: &str, database: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid(format!("{what} name must not be empty")));
    }
    if !database.is_empty() && schema.is_empty() {
        return Err(Error::invalid(format!(
            "{what} '{name}' names database '{database}' without a schema"
        )));
    }
    Ok(())
}

/// Identity of a schema-scoped object: kind plus its three-part name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectDescriptor {
    kind: ObjectKind,
    name: String,
    schema_name: String,
    database_name: String,
}

impl ObjectDescriptor {
    /// Build a descriptor, rejecting an empty name or a database without a schema.
    pub fn new(
        kind: ObjectKind,
        name: impl Into<String>,
        schema_name: impl Into<String>,
        database_name: impl Into<String>,
    ) -> Result<Self> {
        let name = name.into();
        let schema_name = schema_name.into();
        let database_name = database_name.into();
        check_scope(kind.keyword(), &name, &schema_name, &database_name)?;
        Ok(Self {
            kind,
            name,
            schema_name,
            database_name,
        })
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_name(&self) -> &str {
        &self.schema_name
    }

    pub fn database_name(&self) -> &str {
        &self.database_name
    }

    /// Canonical qualified name used in every generated statement
    pub fn qualified_name(&self) -> String {
        qualified_name(&self.database_name, &self.schema_name, &self.name)
    }

    /// Same object under a different name in the same scope
    pub fn renamed(&self, new_name: impl Into<String>) -> Result<Self> {
        Self::new(
            self.kind,
            new_name,
            self.schema_name.clone(),
            self.database_name.clone(),
        )
    }

    /// Short label for logs and error context, e.g. `CONNECTION k1`
    pub fn label(&self) -> String {
        format!("{} {}", self.kind, self.qualified_name())
    }
}

impl fmt::Display for ObjectDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

/// Pointer to another object (SSH tunnel, key secret, PrivateLink connection).
///
/// An absent or empty-named reference means "not configured".
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ObjectReference {
    pub name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub database_name: String,
}

impl ObjectReference {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn in_schema(mut self, schema_name: impl Into<String>) -> Self {
        self.schema_name = schema_name.into();
        self
    }

    pub fn in_database(mut self, database_name: impl Into<String>) -> Self {
        self.database_name = database_name.into();
        self
    }

    pub fn qualified_name(&self) -> String {
        qualified_name(&self.database_name, &self.schema_name, &self.name)
    }

    /// Normalise an optional reference: empty names collapse to `None`,
    /// malformed scopes are rejected.
    pub(crate) fn configured(reference: Option<&Self>, field: &str) -> Result<Option<Self>> {
        match reference {
            Some(r) if !r.name.is_empty() => {
                check_scope(field, &r.name, &r.schema_name, &r.database_name)?;
                Ok(Some(r.clone()))
            }
            _ => Ok(None),
        }
    }
}

impl fmt::Display for ObjectReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name_scopes() {
        assert_eq!(qualified_name("", "", "k1"), "k1");
        assert_eq!(qualified_name("", "sch", "k1"), "sch.k1");
        assert_eq!(qualified_name("db", "sch", "k1"), "db.sch.k1");
        assert_eq!(
            qualified_name("materialize", "public", "My Conn"),
            "materialize.public.\"My Conn\""
        );
    }

    #[test]
    fn test_descriptor_rejects_empty_name() {
        let err = ObjectDescriptor::new(ObjectKind::Connection, "", "public", "materialize")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidDescriptor { .. }));
    }

    #[test]
    fn test_descriptor_rejects_database_without_schema() {
        let err = ObjectDescriptor::new(ObjectKind::Secret, "s1", "", "db").unwrap_err();
        assert!(err.to_string().contains("without a schema"));
    }

    #[test]
    fn test_renamed_keeps_scope() {
        let d = ObjectDescriptor::new(ObjectKind::Connection, "k1", "sch", "db").unwrap();
        let r = d.renamed("k2").unwrap();
        assert_eq!(r.qualified_name(), "db.sch.k2");
        assert_eq!(r.kind(), ObjectKind::Connection);
        assert!(d.renamed("").is_err());
    }

    #[test]
    fn test_label() {
        let d = ObjectDescriptor::new(ObjectKind::MaterializedView, "mv", "s", "d").unwrap();
        assert_eq!(d.label(), "MATERIALIZED VIEW d.s.mv");
    }

    #[test]
    fn test_kind_from_str() {
        assert_eq!("secret".parse::<ObjectKind>().unwrap(), ObjectKind::Secret);
        assert_eq!(
            "materialized_view".parse::<ObjectKind>().unwrap(),
            ObjectKind::MaterializedView
        );
        assert!("cluster".parse::<ObjectKind>().is_err());
    }

    #[test]
    fn test_reference_configured() {
        assert_eq!(ObjectReference::configured(None, "ssh_tunnel").unwrap(), None);

        let empty = ObjectReference::default();
        assert_eq!(
            ObjectReference::configured(Some(&empty), "ssh_tunnel").unwrap(),
            None
        );

        let bad = ObjectReference::new("t").in_database("db");
        assert!(ObjectReference::configured(Some(&bad), "ssh_tunnel").is_err());

        let ok = ObjectReference::new("t").in_schema("s");
        assert_eq!(
            ObjectReference::configured(Some(&ok), "ssh_tunnel")
                .unwrap()
                .unwrap()
                .qualified_name(),
            "s.t"
        );
    }
}
