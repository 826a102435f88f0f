//! Declared resources resolved from the manifest
//!
//! Every manifest block becomes a [`DesiredResource`]: an address that keys
//! it in the state file, the compiled definition, and a fingerprint of the
//! definition used to detect content changes between runs.

use anyhow::{Context, Result};
use ddl::{
    KafkaConnection, KafkaConnectionSpec, ObjectKind, PrivilegeGrant, Secret, SecretGrantSpec,
    SecretSpec, Statements,
};
use lifecycle::{CreationSaga, Desired, Executor, Orchestrator, UpdateReport};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::schema::{Entry, Manifest};

/// Manifest block type, in dependency order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    Secret,
    ConnectionKafka,
    GrantSecret,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Secret => "secret",
            Self::ConnectionKafka => "connection_kafka",
            Self::GrantSecret => "grant_secret",
        }
    }

    /// Kind of the store object, `None` for grants
    pub fn object_kind(&self) -> Option<ObjectKind> {
        match self {
            Self::Secret => Some(ObjectKind::Secret),
            Self::ConnectionKafka => Some(ObjectKind::Connection),
            Self::GrantSecret => None,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "secret" => Ok(Self::Secret),
            "connection_kafka" => Ok(Self::ConnectionKafka),
            "grant_secret" => Ok(Self::GrantSecret),
            _ => anyhow::bail!("unknown resource type '{s}'"),
        }
    }
}

/// `<resource type>.<label>`, the key of a resource in the state file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Address {
    pub resource_type: ResourceType,
    pub label: String,
}

impl Address {
    pub fn new(resource_type: ResourceType, label: impl Into<String>) -> Self {
        Self {
            resource_type,
            label: label.into(),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.resource_type, self.label)
    }
}

impl FromStr for Address {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let (resource_type, label) = s
            .split_once('.')
            .with_context(|| format!("address '{s}' must look like <type>.<label>"))?;
        if label.is_empty() {
            anyhow::bail!("address '{s}' has an empty label");
        }
        Ok(Self::new(resource_type.parse()?, label))
    }
}

impl TryFrom<String> for Address {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Address> for String {
    fn from(address: Address) -> Self {
        address.to_string()
    }
}

/// Compiled definition of one declared resource
#[derive(Debug, Clone)]
pub enum Definition {
    Secret(Desired<Secret>),
    Kafka(Desired<KafkaConnection>),
    Grant(PrivilegeGrant),
}

impl Definition {
    /// Create the object or issue the grant, returning the persisted
    /// identity or grant key.
    pub fn create<E: Executor + ?Sized>(
        &self,
        orchestrator: &Orchestrator<'_, E>,
    ) -> lifecycle::Result<String> {
        match self {
            Self::Secret(desired) => orchestrator.create(desired).map(|id| id.encode()),
            Self::Kafka(desired) => orchestrator.create(desired).map(|id| id.encode()),
            Self::Grant(grant) => orchestrator.grant(grant).map(|key| key.encode()),
        }
    }

    /// Reconcile an existing object. Grants have nothing to update.
    pub fn update<E: Executor + ?Sized>(
        &self,
        orchestrator: &Orchestrator<'_, E>,
        identity: &lifecycle::PersistedIdentity,
        content_changed: bool,
    ) -> lifecycle::Result<UpdateReport> {
        match self {
            Self::Secret(desired) => orchestrator.update(desired, identity, content_changed),
            Self::Kafka(desired) => orchestrator.update(desired, identity, content_changed),
            Self::Grant(_) => Ok(UpdateReport::default()),
        }
    }

    /// Whether a content change can be applied without replacing the object
    pub fn alters_in_place(&self) -> bool {
        match self {
            Self::Secret(desired) => desired.object.alter_sql().is_some(),
            Self::Kafka(desired) => desired.object.alter_sql().is_some(),
            Self::Grant(_) => false,
        }
    }

    /// Statements a fresh apply would issue, secret values masked
    pub fn preview(&self) -> Result<Vec<String>> {
        Ok(match self {
            Self::Secret(desired) => CreationSaga::new(desired)?.display(),
            Self::Kafka(desired) => CreationSaga::new(desired)?.display(),
            Self::Grant(grant) => vec![grant.grant_sql()],
        })
    }

    pub fn qualified_name(&self) -> String {
        match self {
            Self::Secret(desired) => desired.object.object().qualified_name(),
            Self::Kafka(desired) => desired.object.object().qualified_name(),
            Self::Grant(grant) => format!(
                "{} on {} to {}",
                grant.privilege(),
                grant.object().qualified_name(),
                grant.role()
            ),
        }
    }

    pub fn ownership_role(&self) -> Option<&str> {
        match self {
            Self::Secret(desired) => desired.ownership_role(),
            Self::Kafka(desired) => desired.ownership_role(),
            Self::Grant(_) => None,
        }
    }

    pub fn comment(&self) -> Option<&str> {
        match self {
            Self::Secret(desired) => desired.comment(),
            Self::Kafka(desired) => desired.comment(),
            Self::Grant(_) => None,
        }
    }
}

/// A manifest block ready to apply
#[derive(Debug, Clone)]
pub struct DesiredResource {
    pub address: Address,
    pub definition: Definition,
    /// Hash of the definition with the object name left out, so a rename
    /// alone never counts as a content change
    pub fingerprint: String,
    /// Grant block, kept so the grant can be revoked after it leaves the manifest
    pub grant: Option<SecretGrantSpec>,
}

/// Secret key for definition fingerprints.
///
/// Fingerprints cover secret values, so they are keyed hashes: without the
/// key a fingerprint in the state file cannot be checked against guesses.
#[derive(Clone)]
pub struct FingerprintKey([u8; blake3::KEY_LEN]);

impl FingerprintKey {
    pub fn generate() -> Self {
        Self(rand::random())
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        let hash = blake3::Hash::from_hex(hex.trim()).context("Malformed fingerprint key")?;
        Ok(Self(*hash.as_bytes()))
    }

    pub fn to_hex(&self) -> String {
        blake3::Hash::from_bytes(self.0).to_hex().to_string()
    }

    /// Keyed blake3 of the canonical JSON form of a block
    fn fingerprint<T: Serialize>(&self, spec: &T) -> Result<String> {
        let bytes = serde_json::to_vec(spec).context("Failed to serialize definition")?;
        Ok(blake3::keyed_hash(&self.0, &bytes).to_hex().to_string())
    }
}

impl fmt::Debug for FingerprintKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FingerprintKey(********)")
    }
}

fn desired<S: Statements, T>(object: S, entry: &Entry<T>) -> Desired<S> {
    Desired {
        object,
        ownership_role: entry.ownership_role.clone(),
        comment: entry.comment.clone(),
    }
}

fn secret(entry: &Entry<SecretSpec>, key: &FingerprintKey) -> Result<DesiredResource> {
    let unnamed = SecretSpec {
        name: String::new(),
        ..entry.spec.clone()
    };
    Ok(DesiredResource {
        address: Address::new(ResourceType::Secret, entry.address_label()),
        definition: Definition::Secret(desired(entry.spec.resolve()?, entry)),
        fingerprint: key.fingerprint(&unnamed)?,
        grant: None,
    })
}

fn kafka(entry: &Entry<KafkaConnectionSpec>, key: &FingerprintKey) -> Result<DesiredResource> {
    let unnamed = KafkaConnectionSpec {
        name: String::new(),
        ..entry.spec.clone()
    };
    Ok(DesiredResource {
        address: Address::new(ResourceType::ConnectionKafka, entry.address_label()),
        definition: Definition::Kafka(desired(entry.spec.resolve()?, entry)),
        fingerprint: key.fingerprint(&unnamed)?,
        grant: None,
    })
}

fn grant(entry: &Entry<SecretGrantSpec>, key: &FingerprintKey) -> Result<DesiredResource> {
    Ok(DesiredResource {
        address: Address::new(ResourceType::GrantSecret, entry.address_label()),
        definition: Definition::Grant(entry.spec.resolve()?),
        fingerprint: key.fingerprint(&entry.spec)?,
        grant: Some(entry.spec.clone()),
    })
}

/// Resolve every manifest block, sorted by address (dependency order).
pub fn resolve(manifest: &Manifest, key: &FingerprintKey) -> Result<Vec<DesiredResource>> {
    let mut resources = Vec::new();

    for entry in &manifest.secret {
        resources.push(
            secret(entry, key).with_context(|| format!("secret.{}", entry.address_label()))?,
        );
    }
    for entry in &manifest.connection_kafka {
        resources.push(
            kafka(entry, key)
                .with_context(|| format!("connection_kafka.{}", entry.address_label()))?,
        );
    }
    for entry in &manifest.grant_secret {
        resources.push(
            grant(entry, key).with_context(|| format!("grant_secret.{}", entry.address_label()))?,
        );
    }

    resources.sort_by(|a, b| a.address.cmp(&b.address));
    Ok(resources)
}

/// [`resolve`] under a fixed key, so fingerprints match across calls
#[cfg(test)]
pub fn resolve_fixed(manifest: &Manifest) -> Result<Vec<DesiredResource>> {
    resolve(manifest, &FingerprintKey([7; blake3::KEY_LEN]))
}
