use anyhow::{Result, bail};

use crate::Context;
use crate::cli::{ApplyArgs, ConnectionArgs, DestroyArgs};
use crate::engine::{self, ExecuteOptions, Plan};
use crate::resource;

use super::Session;

/// Converge the store to the manifest
pub fn run(_ctx: &Context, args: &ApplyArgs) -> Result<()> {
    let mut session = Session::load(&args.manifest, &args.state)?;
    let key = session.state.load_key(&session.state_path)?;
    let desired = resource::resolve(&session.manifest, &key)?;
    let plan = engine::plan(&desired, &session.state);

    converge(&mut session, &plan, &args.connection, args.dry_run, args.yes)
}

/// Remove everything the state file tracks
pub fn destroy(_ctx: &Context, args: &DestroyArgs) -> Result<()> {
    let mut session = Session::load(&args.manifest, &args.state)?;
    let plan = engine::destroy_plan(&session.state);

    converge(&mut session, &plan, &args.connection, args.dry_run, args.yes)
}

fn converge(
    session: &mut Session,
    plan: &Plan<'_>,
    connection: &ConnectionArgs,
    dry_run: bool,
    yes: bool,
) -> Result<()> {
    let manifest = &session.manifest;
    let summary = engine::execute(
        plan,
        &manifest.region,
        || super::connect(manifest, connection),
        &mut session.state,
        &session.state_path,
        &ExecuteOptions { dry_run, yes },
    )?;

    if !summary.is_success() {
        bail!("{} resources failed", summary.failed);
    }
    Ok(())
}
