//! Privilege grants between a role and an object

use crate::error::{Error, Result};
use crate::name::{ObjectDescriptor, ObjectKind};
use crate::quote::quote_identifier;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Accepted privilege names
pub const PRIVILEGES: [&str; 9] = [
    "SELECT",
    "INSERT",
    "UPDATE",
    "DELETE",
    "USAGE",
    "CREATE",
    "CREATEROLE",
    "CREATEDB",
    "CREATECLUSTER",
];

/// A validated, upper-cased privilege name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Privilege(&'static str);

impl Privilege {
    pub fn parse(value: &str) -> Result<Self> {
        PRIVILEGES
            .iter()
            .copied()
            .find(|p| p.eq_ignore_ascii_case(value.trim()))
            .map(Privilege)
            .ok_or_else(|| Error::invalid(format!("unsupported privilege '{value}'")))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for Privilege {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Raw `grant_secret` block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretGrantSpec {
    pub role_name: String,
    pub privilege: String,
    pub secret_name: String,
    #[serde(default)]
    pub schema_name: String,
    #[serde(default)]
    pub database_name: String,
}

impl SecretGrantSpec {
    pub fn resolve(&self) -> Result<PrivilegeGrant> {
        PrivilegeGrant::new(
            self.role_name.clone(),
            Privilege::parse(&self.privilege)?,
            ObjectDescriptor::new(
                ObjectKind::Secret,
                self.secret_name.clone(),
                self.schema_name.clone(),
                self.database_name.clone(),
            )?,
        )
    }
}

/// One privilege held by a role on an object.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PrivilegeGrant {
    role: String,
    privilege: Privilege,
    object: ObjectDescriptor,
}

impl PrivilegeGrant {
    pub fn new(
        role: impl Into<String>,
        privilege: Privilege,
        object: ObjectDescriptor,
    ) -> Result<Self> {
        let role = role.into();
        if role.is_empty() {
            return Err(Error::invalid("grant role must not be empty"));
        }
        Ok(Self {
            role,
            privilege,
            object,
        })
    }

    pub fn role(&self) -> &str {
        &self.role
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    pub fn object(&self) -> &ObjectDescriptor {
        &self.object
    }

    pub fn grant_sql(&self) -> String {
        format!(
            "GRANT {} ON {} {} TO {};",
            self.privilege,
            self.object.kind(),
            self.object.qualified_name(),
            quote_identifier(&self.role)
        )
    }

    pub fn revoke_sql(&self) -> String {
        format!(
            "REVOKE {} ON {} {} FROM {};",
            self.privilege,
            self.object.kind(),
            self.object.qualified_name(),
            quote_identifier(&self.role)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn usage_on_secret() -> SecretGrantSpec {
        SecretGrantSpec {
            role_name: "r1".into(),
            privilege: "SELECT".into(),
            secret_name: "s1".into(),
            schema_name: "sch".into(),
            database_name: "db".into(),
        }
    }

    #[test]
    fn test_grant_and_revoke() {
        let grant = usage_on_secret().resolve().unwrap();
        assert_eq!(grant.grant_sql(), "GRANT SELECT ON SECRET db.sch.s1 TO r1;");
        assert_eq!(grant.revoke_sql(), "REVOKE SELECT ON SECRET db.sch.s1 FROM r1;");
    }

    #[test]
    fn test_privilege_normalised() {
        assert_eq!(Privilege::parse("usage").unwrap().as_str(), "USAGE");
        assert!(Privilege::parse("OWN").is_err());
    }

    #[test]
    fn test_empty_role_rejected() {
        let spec = SecretGrantSpec {
            role_name: String::new(),
            ..usage_on_secret()
        };
        assert!(matches!(
            spec.resolve(),
            Err(Error::InvalidDescriptor { .. })
        ));
    }
}
