use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest file names tried in the config directory, in order
const MANIFEST_NAMES: [&str; 2] = ["mzconverge.toml", "mzconverge.json"];

/// Get the config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("mzconverge"))
}

/// Expand `~` and environment variables in a user-supplied path
pub fn expand_path(path: &Path) -> Result<PathBuf> {
    let raw = path.to_string_lossy();
    let expanded = shellexpand::full(&raw)
        .with_context(|| format!("Could not expand path: {raw}"))?;
    Ok(PathBuf::from(expanded.as_ref()))
}

/// Explicit manifest path, or the first manifest found in the config directory
pub fn manifest_path(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return expand_path(path);
    }

    let dir = config_dir()?;
    MANIFEST_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
        .with_context(|| format!("No manifest found in {} (pass --file)", dir.display()))
}

/// Load a TOML or JSON file, picking the format from the extension
pub fn load_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Could not read {}", path.display()))?;

    match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => {
            toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))
        }
        Some("json") => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display())),
        _ => bail!(
            "Unsupported manifest format: {} (expected .toml or .json)",
            path.display()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        region: String,
    }

    #[test]
    fn test_load_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("m.toml");
        fs::write(&toml_path, "region = \"aws/us-east-1\"\n").unwrap();
        let toml: Sample = load_file(&toml_path).unwrap();

        let json_path = dir.path().join("m.json");
        fs::write(&json_path, r#"{"region": "aws/us-east-1"}"#).unwrap();
        let json: Sample = load_file(&json_path).unwrap();

        assert_eq!(toml, json);
    }

    #[test]
    fn test_load_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.yaml");
        fs::write(&path, "region: x").unwrap();
        assert!(load_file::<Sample>(&path).is_err());
    }

    #[test]
    fn test_explicit_manifest_path_is_used() {
        let path = manifest_path(Some(Path::new("/tmp/m.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/m.toml"));
    }
}
