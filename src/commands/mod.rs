pub mod apply;
pub mod plan;
pub mod refresh;
pub mod state;

use anyhow::{Result, bail};

use crate::cli::{ConnectionArgs, ManifestArgs, StateArgs};
use crate::config;
use crate::runner::PgExecutor;
use crate::schema::Manifest;
use crate::state::ConvergeState;
use std::path::PathBuf;

/// Manifest, state and its path, loaded for a command that touches the store
pub struct Session {
    pub manifest: Manifest,
    pub state: ConvergeState,
    pub state_path: PathBuf,
}

impl Session {
    pub fn load(manifest: &ManifestArgs, state: &StateArgs) -> Result<Self> {
        let manifest = Manifest::load(&config::manifest_path(manifest.file.as_deref())?)?;
        let state_path = ConvergeState::path(state.state.as_deref())?;
        let mut state = ConvergeState::load_from(&state_path)?;
        state.claim_region(&manifest.region)?;
        Ok(Self {
            manifest,
            state,
            state_path,
        })
    }
}

/// Connect to `--url`, `MZCONVERGE_URL`, or the manifest's url
pub fn connect(manifest: &Manifest, connection: &ConnectionArgs) -> Result<PgExecutor> {
    let url = connection_url(connection, manifest)?;
    PgExecutor::connect(&url)
}

fn connection_url(connection: &ConnectionArgs, manifest: &Manifest) -> Result<String> {
    match connection.url.as_ref().or(manifest.connection.url.as_ref()) {
        Some(url) if !url.is_empty() => Ok(url.clone()),
        _ => bail!("No connection URL: pass --url, set MZCONVERGE_URL, or set [connection] url"),
    }
}
