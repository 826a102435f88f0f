use anyhow::Result;
use lifecycle::{Executor, Orchestrator};

use crate::Context;
use crate::cli::RefreshArgs;
use crate::state::ConvergeState;
use crate::ui;

use super::Session;

/// Re-read every tracked object and bring the state file in line
pub fn run(ctx: &Context, args: &RefreshArgs) -> Result<()> {
    let mut session = Session::load(&args.manifest, &args.state)?;
    let executor = super::connect(&session.manifest, &args.connection)?;
    let orchestrator = Orchestrator::new(&executor, &session.manifest.region);

    let report = refresh(&orchestrator, &mut session.state)?;
    session.state.save_to(&session.state_path)?;

    if !ctx.quiet {
        ui::success(&format!(
            "Refreshed {} resources ({} changed, {} gone)",
            report.read, report.changed, report.gone
        ));
    }
    Ok(())
}

#[derive(Debug, Default, PartialEq, Eq)]
struct RefreshReport {
    read: usize,
    changed: usize,
    gone: usize,
}

/// Objects take on the name, owner and comment the store reports; grants
/// are only checked for presence. Anything the store no longer has is
/// forgotten so the next apply recreates it.
fn refresh<E: Executor + ?Sized>(
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
) -> Result<RefreshReport> {
    let mut report = RefreshReport::default();
    let mut gone = Vec::new();

    for (address, tracked) in &mut state.resources {
        let observed = match address.resource_type.object_kind() {
            Some(kind) => orchestrator
                .read(kind, &tracked.persisted_identity()?)
                .map(Some),
            None => orchestrator.read_grant(&tracked.grant_key()?).map(|()| None),
        };
        let observed = match observed {
            Err(e) if e.is_not_found() => {
                ui::warn(&format!("{address} no longer exists, forgetting it"));
                gone.push(address.clone());
                continue;
            }
            observed => observed?,
        };
        report.read += 1;

        let Some(observed) = observed else {
            continue;
        };
        let renamed = !same_name(&tracked.qualified_name, observed.descriptor.name());
        let owner = Some(observed.owner_name);
        if renamed || tracked.ownership_role != owner || tracked.comment != observed.comment {
            ui::dim(&format!("{address} drifted"));
            report.changed += 1;
            if renamed {
                tracked.qualified_name = observed.descriptor.qualified_name();
            }
            tracked.ownership_role = owner;
            tracked.comment = observed.comment;
        }
    }

    for address in &gone {
        state.untrack(address);
    }
    report.gone = gone.len();
    Ok(report)
}

/// Whether a recorded qualified name still ends in `name`. The catalog
/// always reports full scope; the manifest may not have declared it.
fn same_name(recorded: &str, name: &str) -> bool {
    let bare = ddl::quote_identifier(name);
    recorded == bare || recorded.ends_with(&format!(".{bare}"))
}
