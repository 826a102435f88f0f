//! Execution engine - runs a plan through the lifecycle orchestrator

use anyhow::{Context as AnyhowContext, Result};
use colored::Colorize;
use lifecycle::{Executor, Orchestrator};
use std::path::Path;

use crate::resource::{Address, DesiredResource};
use crate::state::{ConvergeState, TrackedResource};
use crate::ui;

use super::differ::display_plan;
use super::planner::{Action, Plan};

/// Options for execution
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Don't make changes, just show what would happen
    pub dry_run: bool,
    /// Skip confirmation prompts
    pub yes: bool,
}

/// Summary of execution results
#[derive(Debug, Default)]
pub struct ExecuteSummary {
    pub created: usize,
    pub modified: usize,
    pub replaced: usize,
    pub removed: usize,
    pub skipped: usize,
    pub failed: usize,
    pub no_change: usize,
}

impl ExecuteSummary {
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.replaced + self.removed
    }

    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Created => self.created += 1,
            Outcome::Modified => self.modified += 1,
            Outcome::Replaced => self.replaced += 1,
            Outcome::Removed => self.removed += 1,
            Outcome::Unchanged => self.no_change += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Created,
    Modified,
    Replaced,
    Removed,
    Unchanged,
}

/// Show the plan, confirm, then run it.
///
/// `connect` is only called once there is something to apply, so empty
/// plans and dry runs never need a reachable store.
pub fn execute<E, F>(
    plan: &Plan<'_>,
    region: &str,
    connect: F,
    state: &mut ConvergeState,
    state_path: &Path,
    opts: &ExecuteOptions,
) -> Result<ExecuteSummary>
where
    E: Executor,
    F: FnOnce() -> Result<E>,
{
    display_plan(plan);

    if plan.is_empty() {
        return Ok(ExecuteSummary::default());
    }

    if !opts.yes && !opts.dry_run && !confirm_proceed()? {
        let summary = ExecuteSummary {
            skipped: plan.len(),
            ..Default::default()
        };
        println!();
        println!("  {} Aborted, {} changes skipped", "✗".red(), summary.skipped);
        return Ok(summary);
    }

    if opts.dry_run {
        println!();
        println!("  {} Dry run - no changes made", "ℹ".blue());
        return Ok(ExecuteSummary::default());
    }

    println!();
    println!("  {} Applying {} changes...", "→".cyan(), plan.len());

    let executor = connect()?;
    let orchestrator = Orchestrator::new(&executor, region);
    let summary = run_actions(plan, &orchestrator, state, state_path)?;
    print_summary(&summary);
    Ok(summary)
}

/// Run every action in order, saving state after each success.
///
/// A failed action is reported and counted; later actions still run, and
/// the ones depending on it fail on their own.
pub fn run_actions<E: Executor + ?Sized>(
    plan: &Plan<'_>,
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
    state_path: &Path,
) -> Result<ExecuteSummary> {
    let mut summary = ExecuteSummary::default();

    for (i, action) in plan.actions.iter().enumerate() {
        ui::step(i + 1, plan.len(), &action.address().to_string());
        match apply(action, orchestrator, state) {
            Ok(outcome) => {
                summary.record(outcome);
                state.save_to(state_path)?;
            }
            Err(e) => {
                ui::error(&format!("{}: {e:#}", action.address()));
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

fn apply<E: Executor + ?Sized>(
    action: &Action<'_>,
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
) -> Result<Outcome> {
    match action {
        Action::Create(resource) => {
            create(resource, orchestrator, state)?;
            Ok(Outcome::Created)
        }
        Action::Update {
            resource,
            content_changed,
        } => update(resource, *content_changed, orchestrator, state),
        Action::Replace(resource) | Action::Regrant(resource) => {
            replace(resource, orchestrator, state)?;
            Ok(Outcome::Replaced)
        }
        Action::Delete { address, tracked } => {
            remove(address, tracked, orchestrator)?;
            state.untrack(address);
            Ok(Outcome::Removed)
        }
    }
}

fn create<E: Executor + ?Sized>(
    resource: &DesiredResource,
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
) -> Result<()> {
    let identity = resource.definition.create(orchestrator)?;
    ui::dim(&format!("tracked as {identity}"));
    state.track(
        resource.address.clone(),
        TrackedResource::created(resource, identity),
    );
    Ok(())
}

/// Drop the object or revoke the grant behind a tracked resource.
fn remove<E: Executor + ?Sized>(
    address: &Address,
    tracked: &TrackedResource,
    orchestrator: &Orchestrator<'_, E>,
) -> Result<()> {
    match address.resource_type.object_kind() {
        Some(kind) => orchestrator.delete(kind, &tracked.persisted_identity()?)?,
        None => {
            let grant = tracked
                .grant
                .as_ref()
                .with_context(|| format!("{address} has no grant recorded in state"))?
                .resolve()?;
            match orchestrator.revoke(&grant) {
                Err(e) if e.is_unknown_object() => {
                    ui::warn(&format!("{address}: grant target is already gone"));
                }
                result => result?,
            }
        }
    }
    Ok(())
}

fn replace<E: Executor + ?Sized>(
    resource: &DesiredResource,
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
) -> Result<()> {
    if let Some(tracked) = state.get(&resource.address).cloned() {
        remove(&resource.address, &tracked, orchestrator)?;
        state.untrack(&resource.address);
    }
    create(resource, orchestrator, state)
}

fn update<E: Executor + ?Sized>(
    resource: &DesiredResource,
    content_changed: bool,
    orchestrator: &Orchestrator<'_, E>,
    state: &mut ConvergeState,
) -> Result<Outcome> {
    let mut tracked = state
        .get(&resource.address)
        .cloned()
        .with_context(|| format!("{} is not tracked", resource.address))?;
    let identity = tracked.persisted_identity()?;

    match resource
        .definition
        .update(orchestrator, &identity, content_changed)
    {
        Ok(report) => {
            for label in &report.applied {
                ui::dim(label);
            }
            tracked.applied(resource);
            state.track(resource.address.clone(), tracked);
            Ok(if report.is_noop() {
                Outcome::Unchanged
            } else {
                Outcome::Modified
            })
        }
        Err(lifecycle::Error::RequiresReplacement { field, .. }) => {
            ui::dim(&format!("{field} changed, replacing"));
            replace(resource, orchestrator, state)?;
            Ok(Outcome::Replaced)
        }
        Err(e) if e.is_not_found() => {
            ui::warn(&format!(
                "{} was removed outside mzconverge, recreating",
                resource.address
            ));
            state.untrack(&resource.address);
            create(resource, orchestrator, state)?;
            Ok(Outcome::Created)
        }
        Err(e) => Err(e.into()),
    }
}

/// Confirm with user
fn confirm_proceed() -> Result<bool> {
    use dialoguer::Confirm;

    let confirmed = Confirm::new()
        .with_prompt("Continue?")
        .default(false)
        .interact()?;

    Ok(confirmed)
}

/// Print final summary
fn print_summary(summary: &ExecuteSummary) {
    println!();
    let total = summary.total_changes();
    if summary.is_success() {
        println!("  {} {total} changes applied successfully!", "✓".green().bold());
    } else {
        println!("  {} {total} changes applied with errors", "⚠".yellow().bold());
    }

    if summary.created > 0 {
        println!("    • {} resources created", summary.created);
    }
    if summary.modified > 0 {
        println!("    • {} resources modified", summary.modified);
    }
    if summary.replaced > 0 {
        println!("    • {} resources replaced", summary.replaced);
    }
    if summary.removed > 0 {
        println!("    • {} resources removed", summary.removed);
    }
    if summary.no_change > 0 {
        println!("    • {} resources already up to date", summary.no_change);
    }
    if summary.failed > 0 {
        println!("    • {} {} failed", summary.failed, "resources".red());
    }
}
