use anyhow::{Context, Result, bail};
use chrono::{DateTime, Utc};
use ddl::SecretGrantSpec;
use lifecycle::{GrantKey, PersistedIdentity};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::resource::{Address, DesiredResource, FingerprintKey};

// ============================================================================
// State Structures
// ============================================================================

/// Everything mzconverge has created, keyed by address
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ConvergeState {
    /// Region the tracked identities belong to
    #[serde(default)]
    pub region: Option<String>,

    /// Last time the state was updated
    pub last_updated: DateTime<Utc>,

    #[serde(default)]
    pub resources: BTreeMap<Address, TrackedResource>,
}

/// One created object or issued grant
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TrackedResource {
    /// `region:id` for objects, the grant key for grants
    pub identity: String,

    /// Qualified name as last applied or read back
    pub qualified_name: String,

    /// Fingerprint of the applied definition
    pub fingerprint: String,

    #[serde(default)]
    pub ownership_role: Option<String>,

    #[serde(default)]
    pub comment: Option<String>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    /// Grant block, needed to revoke once it leaves the manifest
    #[serde(default)]
    pub grant: Option<SecretGrantSpec>,
}

impl TrackedResource {
    /// Record a freshly created resource
    pub fn created(resource: &DesiredResource, identity: String) -> Self {
        let now = Utc::now();
        Self {
            identity,
            qualified_name: resource.definition.qualified_name(),
            fingerprint: resource.fingerprint.clone(),
            ownership_role: resource.definition.ownership_role().map(str::to_string),
            comment: resource.definition.comment().map(str::to_string),
            created_at: now,
            updated_at: now,
            grant: resource.grant.clone(),
        }
    }

    /// Take on the applied definition, keeping identity and creation time
    pub fn applied(&mut self, resource: &DesiredResource) {
        self.qualified_name = resource.definition.qualified_name();
        self.fingerprint = resource.fingerprint.clone();
        self.ownership_role = resource.definition.ownership_role().map(str::to_string);
        self.comment = resource.definition.comment().map(str::to_string);
        self.grant = resource.grant.clone();
        self.updated_at = Utc::now();
    }

    pub fn persisted_identity(&self) -> Result<PersistedIdentity> {
        self.identity
            .parse()
            .with_context(|| format!("Corrupt identity in state: {}", self.identity))
    }

    pub fn grant_key(&self) -> Result<GrantKey> {
        self.identity
            .parse()
            .with_context(|| format!("Corrupt grant key in state: {}", self.identity))
    }
}

impl Default for ConvergeState {
    fn default() -> Self {
        Self {
            region: None,
            last_updated: Utc::now(),
            resources: BTreeMap::new(),
        }
    }
}

// ============================================================================
// ConvergeState Implementation
// ============================================================================

impl ConvergeState {
    /// Get the state directory path (~/.local/state/mzconverge)
    pub fn state_dir() -> Result<PathBuf> {
        let home = dirs::home_dir().context("Could not determine home directory")?;
        Ok(home.join(".local").join("state").join("mzconverge"))
    }

    /// Explicit state file path, or the default one
    pub fn path(explicit: Option<&Path>) -> Result<PathBuf> {
        match explicit {
            Some(path) => crate::config::expand_path(path),
            None => Ok(Self::state_dir()?.join("state.toml")),
        }
    }

    /// Load state from disk, or return default if file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("State file does not exist, using default state");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read state file: {}", path.display()))?;

        let state: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse state file: {}", path.display()))?;

        log::debug!("Loaded state from {}", path.display());
        Ok(state)
    }

    /// Save state to disk, stamping `last_updated`
    pub fn save_to(&mut self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }

        self.last_updated = Utc::now();
        let content = toml::to_string_pretty(&self).context("Failed to serialize state to TOML")?;

        fs::write(path, &content)
            .with_context(|| format!("Failed to write state file: {}", path.display()))?;

        log::debug!("Saved state to {}", path.display());
        Ok(())
    }

    /// Fingerprint key file kept beside the state file
    pub fn key_path(path: &Path) -> PathBuf {
        path.with_extension("key")
    }

    /// Load the fingerprint key for the state at `path`.
    ///
    /// A missing key is generated only while nothing is tracked: with
    /// resources present, a new key would make every fingerprint differ.
    pub fn load_key(&self, path: &Path) -> Result<FingerprintKey> {
        let key_path = Self::key_path(path);
        if key_path.exists() {
            let hex = fs::read_to_string(&key_path)
                .with_context(|| format!("Failed to read key file: {}", key_path.display()))?;
            return FingerprintKey::from_hex(&hex)
                .with_context(|| format!("Corrupt key file: {}", key_path.display()));
        }
        if !self.resources.is_empty() {
            bail!(
                "Key file {} is missing but the state tracks {} resources",
                key_path.display(),
                self.resources.len()
            );
        }

        let key = FingerprintKey::generate();
        if let Some(dir) = key_path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create state directory: {}", dir.display()))?;
        }
        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options
            .open(&key_path)
            .with_context(|| format!("Failed to create key file: {}", key_path.display()))?;
        writeln!(file, "{}", key.to_hex())
            .with_context(|| format!("Failed to write key file: {}", key_path.display()))?;

        log::info!("Generated fingerprint key {}", key_path.display());
        Ok(key)
    }

    /// Bind the state to a region, refusing identities from another one
    pub fn claim_region(&mut self, region: &str) -> Result<()> {
        match &self.region {
            Some(tracked) if tracked != region => anyhow::bail!(
                "State tracks region '{tracked}' but the manifest declares '{region}'"
            ),
            Some(_) => Ok(()),
            None => {
                self.region = Some(region.to_string());
                Ok(())
            }
        }
    }

    pub fn get(&self, address: &Address) -> Option<&TrackedResource> {
        self.resources.get(address)
    }

    pub fn track(&mut self, address: Address, resource: TrackedResource) {
        self.resources.insert(address, resource);
    }

    pub fn untrack(&mut self, address: &Address) -> Option<TrackedResource> {
        self.resources.remove(address)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;

    fn tracked(identity: &str) -> TrackedResource {
        let now = Utc::now();
        TrackedResource {
            identity: identity.to_string(),
            qualified_name: "k1".to_string(),
            fingerprint: blake3::hash(b"k1").to_hex().to_string(),
            ownership_role: Some("analysts".to_string()),
            comment: None,
            created_at: now,
            updated_at: now,
            grant: None,
        }
    }

    #[test]
    fn test_default_state() {
        let state = ConvergeState::default();
        assert!(state.resources.is_empty());
        assert!(state.region.is_none());
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let state = ConvergeState::load_from(&dir.path().join("state.toml")).unwrap();
        assert!(state.resources.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");

        let mut state = ConvergeState::default();
        state.claim_region("aws/us-east-1").unwrap();
        state.track(
            Address::new(ResourceType::ConnectionKafka, "k1"),
            tracked("aws/us-east-1:u1"),
        );
        let mut grant = tracked("aws/us-east-1:GRANT|SECRET|u5|u9|USAGE");
        grant.grant = Some(SecretGrantSpec {
            role_name: "r1".into(),
            privilege: "USAGE".into(),
            secret_name: "pw".into(),
            ..SecretGrantSpec::default()
        });
        state.track(Address::new(ResourceType::GrantSecret, "g"), grant.clone());
        state.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("connection_kafka.k1"));

        let loaded = ConvergeState::load_from(&path).unwrap();
        assert_eq!(loaded.region.as_deref(), Some("aws/us-east-1"));
        assert_eq!(loaded.resources.len(), 2);
        let k1 = loaded
            .get(&Address::new(ResourceType::ConnectionKafka, "k1"))
            .unwrap();
        assert_eq!(k1.persisted_identity().unwrap().id(), "u1");
        assert_eq!(k1.ownership_role.as_deref(), Some("analysts"));
        let g = loaded
            .get(&Address::new(ResourceType::GrantSecret, "g"))
            .unwrap();
        assert_eq!(g.grant_key().unwrap().role_id(), "u9");
        assert_eq!(g.grant, grant.grant);
    }

    #[test]
    fn test_claim_region() {
        let mut state = ConvergeState::default();
        state.claim_region("a").unwrap();
        state.claim_region("a").unwrap();
        assert!(state.claim_region("b").is_err());
    }

    #[test]
    fn test_untrack() {
        let mut state = ConvergeState::default();
        let address = Address::new(ResourceType::Secret, "pw");
        state.track(address.clone(), tracked("r:u1"));
        assert!(state.untrack(&address).is_some());
        assert!(state.untrack(&address).is_none());
    }

    #[test]
    fn test_key_created_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("state.toml");
        let state = ConvergeState::default();

        let first = state.load_key(&path).unwrap();
        let second = state.load_key(&path).unwrap();
        assert_eq!(first.to_hex(), second.to_hex());
        assert!(ConvergeState::key_path(&path).ends_with("nested/state.key"));

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(ConvergeState::key_path(&path))
                .unwrap()
                .permissions()
                .mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_missing_key_with_tracked_resources() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let mut state = ConvergeState::default();
        state.track(Address::new(ResourceType::Secret, "pw"), tracked("r:u1"));

        let err = state.load_key(&path).unwrap_err();
        assert!(err.to_string().contains("missing"));
        assert!(!ConvergeState::key_path(&path).exists());
    }

    #[test]
    fn test_corrupt_key_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        fs::write(ConvergeState::key_path(&path), "not a key").unwrap();
        assert!(ConvergeState::default().load_key(&path).is_err());
    }

    #[test]
    fn test_corrupt_identity() {
        assert!(tracked("no-separator").persisted_identity().is_err());
        assert!(tracked("r:u1").grant_key().is_err());
    }
}
