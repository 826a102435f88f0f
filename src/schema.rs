use anyhow::{Context, Result, bail};
use ddl::{KafkaConnectionSpec, SecretGrantSpec, SecretSpec};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

// ============================================================================
// Main Manifest Schema
// ============================================================================

/// Declared state of one Materialize region
#[derive(Debug, Serialize, Deserialize, Default)]
pub struct Manifest {
    /// Region the objects live in, part of every persisted identity
    pub region: String,

    /// How to reach the store
    #[serde(default)]
    pub connection: ConnectionConfig,

    #[serde(default)]
    pub secret: Vec<Entry<SecretSpec>>,

    #[serde(default)]
    pub connection_kafka: Vec<Entry<KafkaConnectionSpec>>,

    #[serde(default)]
    pub grant_secret: Vec<Entry<SecretGrantSpec>>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConnectionConfig {
    /// libpq-style connection URL, `sslmode` included
    #[serde(default)]
    pub url: Option<String>,
}

/// One declared block plus the attributes shared by every block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry<T> {
    /// Stable address in the state file; defaults to the object name
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub ownership_role: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    #[serde(flatten)]
    pub spec: T,
}

impl<T> Entry<T> {
    pub fn new(spec: T) -> Self {
        Self {
            label: None,
            ownership_role: None,
            comment: None,
            spec,
        }
    }

    fn label_or(&self, fallback: impl FnOnce() -> String) -> String {
        self.label
            .clone()
            .filter(|l| !l.is_empty())
            .unwrap_or_else(fallback)
    }
}

impl Entry<SecretSpec> {
    pub fn address_label(&self) -> String {
        self.label_or(|| self.spec.name.clone())
    }
}

impl Entry<KafkaConnectionSpec> {
    pub fn address_label(&self) -> String {
        self.label_or(|| self.spec.name.clone())
    }
}

impl Entry<SecretGrantSpec> {
    pub fn address_label(&self) -> String {
        self.label_or(|| {
            format!(
                "{}_{}_{}",
                self.spec.secret_name,
                self.spec.role_name,
                self.spec.privilege.to_lowercase()
            )
        })
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let manifest: Self = crate::config::load_file(path)?;
        manifest
            .validate()
            .with_context(|| format!("Invalid manifest {}", path.display()))?;
        log::debug!("Loaded manifest from {}", path.display());
        Ok(manifest)
    }

    /// Structural checks that need the whole manifest. Per-object checks
    /// happen when each block is resolved.
    pub fn validate(&self) -> Result<()> {
        if self.region.is_empty() {
            bail!("region must be set");
        }
        if self.region.contains(':') {
            bail!("region '{}' must not contain ':'", self.region);
        }

        unique_labels("secret", self.secret.iter().map(|e| e.address_label()))?;
        unique_labels(
            "connection_kafka",
            self.connection_kafka.iter().map(|e| e.address_label()),
        )?;
        unique_labels(
            "grant_secret",
            self.grant_secret.iter().map(|e| e.address_label()),
        )?;

        if let Some(grant) = self
            .grant_secret
            .iter()
            .find(|g| g.ownership_role.is_some() || g.comment.is_some())
        {
            bail!(
                "grant_secret.{} cannot set ownership_role or comment",
                grant.address_label()
            );
        }

        Ok(())
    }
}

fn unique_labels(kind: &str, labels: impl Iterator<Item = String>) -> Result<()> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label.clone()) {
            bail!("duplicate {kind} label '{label}'");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
region = "aws/us-east-1"

[connection]
url = "postgres://mz@localhost:6875/materialize"

[[secret]]
name = "pw_secret"
value = "hunter2"

[[connection_kafka]]
label = "prod"
name = "k1"
ownership_role = "analysts"
comment = "prod kafka"
sasl_mechanisms = "PLAIN"
sasl_username = { text = "u" }
sasl_password = { name = "pw_secret" }

[[connection_kafka.kafka_broker]]
broker = "b1:9092"

[[grant_secret]]
role_name = "r1"
privilege = "USAGE"
secret_name = "pw_secret"
"#;

    #[test]
    fn test_parse_manifest() {
        let manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        manifest.validate().unwrap();

        assert_eq!(
            manifest.connection.url.as_deref(),
            Some("postgres://mz@localhost:6875/materialize")
        );
        assert_eq!(manifest.secret[0].address_label(), "pw_secret");

        let kafka = &manifest.connection_kafka[0];
        assert_eq!(kafka.address_label(), "prod");
        assert_eq!(kafka.ownership_role.as_deref(), Some("analysts"));
        assert_eq!(kafka.spec.name, "k1");
        assert_eq!(kafka.spec.kafka_broker.len(), 1);
        assert!(kafka.spec.validate);

        assert_eq!(
            manifest.grant_secret[0].address_label(),
            "pw_secret_r1_usage"
        );
    }

    #[test]
    fn test_field_order_does_not_matter() {
        let reordered = r#"
region = "aws/us-east-1"

[[connection_kafka]]
sasl_password = { name = "pw_secret" }
sasl_username = { text = "u" }
sasl_mechanisms = "PLAIN"
comment = "prod kafka"
ownership_role = "analysts"
name = "k1"
label = "prod"

[[connection_kafka.kafka_broker]]
broker = "b1:9092"
"#;
        let a: Manifest = toml::from_str(MANIFEST).unwrap();
        let b: Manifest = toml::from_str(reordered).unwrap();
        assert_eq!(a.connection_kafka[0].spec, b.connection_kafka[0].spec);
    }

    #[test]
    fn test_missing_region_rejected() {
        let manifest = Manifest::default();
        assert!(manifest.validate().is_err());
    }

    #[test]
    fn test_duplicate_labels_rejected() {
        let mut manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        manifest.secret.push(manifest.secret[0].clone());
        let err = manifest.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate secret label"));
    }

    #[test]
    fn test_grant_with_owner_rejected() {
        let mut manifest: Manifest = toml::from_str(MANIFEST).unwrap();
        manifest.grant_secret[0].ownership_role = Some("x".into());
        assert!(manifest.validate().is_err());
    }
}
