//! Privilege grants and their composite keys

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::identity::{SEPARATOR, exactly_one};
use crate::orchestrator::Orchestrator;
use ddl::{ObjectKind, Privilege, PrivilegeGrant, catalog};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const MARKER: &str = "GRANT";
const FIELD_SEPARATOR: char = '|';

/// Identity of one grant: `region:GRANT|<KIND>|<object id>|<role id>|<PRIVILEGE>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct GrantKey {
    region: String,
    object_kind: ObjectKind,
    object_id: String,
    role_id: String,
    privilege: Privilege,
}

impl GrantKey {
    pub fn new(
        region: impl Into<String>,
        object_kind: ObjectKind,
        object_id: impl Into<String>,
        role_id: impl Into<String>,
        privilege: Privilege,
    ) -> Result<Self> {
        let key = Self {
            region: region.into(),
            object_kind,
            object_id: object_id.into(),
            role_id: role_id.into(),
            privilege,
        };
        if key.region.is_empty() || key.region.contains(SEPARATOR) {
            return Err(Error::malformed(key.encode(), "invalid region"));
        }
        if [&key.object_id, &key.role_id]
            .iter()
            .any(|id| id.is_empty() || id.contains(FIELD_SEPARATOR))
        {
            return Err(Error::malformed(key.encode(), "invalid object or role id"));
        }
        Ok(key)
    }

    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn object_kind(&self) -> ObjectKind {
        self.object_kind
    }

    pub fn object_id(&self) -> &str {
        &self.object_id
    }

    pub fn role_id(&self) -> &str {
        &self.role_id
    }

    pub fn privilege(&self) -> Privilege {
        self.privilege
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }

    pub fn decode(value: &str) -> Result<Self> {
        let (region, rest) = value
            .split_once(SEPARATOR)
            .ok_or_else(|| Error::malformed(value, "missing region separator"))?;
        let fields: Vec<&str> = rest.split(FIELD_SEPARATOR).collect();
        let [marker, kind, object_id, role_id, privilege] = fields[..] else {
            return Err(Error::malformed(value, "expected five grant fields"));
        };
        if marker != MARKER {
            return Err(Error::malformed(value, "missing GRANT marker"));
        }
        let object_kind = kind
            .parse::<ObjectKind>()
            .map_err(|_| Error::malformed(value, "unknown object kind"))?;
        let privilege =
            Privilege::parse(privilege).map_err(|_| Error::malformed(value, "unknown privilege"))?;
        Self::new(region, object_kind, object_id, role_id, privilege)
    }
}

impl fmt::Display for GrantKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let fields = [
            MARKER,
            self.object_kind.keyword(),
            &self.object_id,
            &self.role_id,
            self.privilege.as_str(),
        ];
        write!(f, "{}{SEPARATOR}", self.region)?;
        for (i, field) in fields.iter().enumerate() {
            if i > 0 {
                write!(f, "{FIELD_SEPARATOR}")?;
            }
            f.write_str(field)?;
        }
        Ok(())
    }
}

impl FromStr for GrantKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}

impl TryFrom<String> for GrantKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::decode(&value)
    }
}

impl From<GrantKey> for String {
    fn from(key: GrantKey) -> Self {
        key.encode()
    }
}

fn describe(grant: &PrivilegeGrant) -> String {
    format!(
        "{} on {} to {}",
        grant.privilege(),
        grant.object().label(),
        grant.role()
    )
}

impl<E: Executor + ?Sized> Orchestrator<'_, E> {
    /// Issue the grant, then resolve both ids into its key.
    ///
    /// A failed id lookup is surfaced; the privilege stays granted.
    pub fn grant(&self, grant: &PrivilegeGrant) -> Result<GrantKey> {
        let what = describe(grant);
        self.execute(&format!("grant {what}"), &grant.grant_sql())?;

        let object_id = self.object_id(grant.object())?;
        let role_id = self.role_id(grant.role())?;
        let key = GrantKey::new(
            self.region(),
            grant.object().kind(),
            object_id,
            role_id,
            grant.privilege(),
        )?;
        log::info!("granted {what} as {key}");
        Ok(key)
    }

    pub fn revoke(&self, grant: &PrivilegeGrant) -> Result<()> {
        self.execute(&format!("revoke {}", describe(grant)), &grant.revoke_sql())?;
        Ok(())
    }

    /// Check that the privilege behind `key` is still held.
    /// `NotFound` means it was revoked or the object is gone.
    pub fn read_grant(&self, key: &GrantKey) -> Result<()> {
        let what = key.to_string();
        let sql = catalog::read_privilege(
            key.object_kind(),
            key.object_id(),
            key.role_id(),
            key.privilege(),
        );
        let rows = self.execute(&format!("read {what}"), &sql)?;
        exactly_one(&what, rows).map(|_| ())
    }
}
