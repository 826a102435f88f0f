//! Plan display

use colored::Colorize;

use super::planner::{Action, Plan};

/// Symbol and verb shown for an action
fn describe(action: &Action<'_>) -> (colored::ColoredString, &'static str) {
    match action {
        Action::Create(_) => ("+".green(), "create"),
        Action::Update {
            content_changed: true,
            ..
        } => ("~".yellow(), "alter"),
        Action::Update { .. } => ("~".yellow(), "update"),
        Action::Replace(_) => ("±".red(), "replace"),
        Action::Regrant(_) => ("±".yellow(), "regrant"),
        Action::Delete { .. } => ("-".red(), "remove"),
    }
}

fn target(action: &Action<'_>) -> String {
    match action {
        Action::Create(resource)
        | Action::Update { resource, .. }
        | Action::Replace(resource)
        | Action::Regrant(resource) => resource.definition.qualified_name(),
        Action::Delete { tracked, .. } => tracked.qualified_name.clone(),
    }
}

/// Display a plan in a user-friendly format
pub fn display_plan(plan: &Plan<'_>) {
    if plan.is_empty() {
        println!();
        println!("  {} No changes needed", "✓".green());
        return;
    }

    println!();
    println!(
        "┌─ {} ─────────────────────────────────────────┐",
        "Planned Changes".bold()
    );
    println!("│");

    for action in &plan.actions {
        let (symbol, verb) = describe(action);
        println!(
            "│   {} {:<36} {} {}",
            symbol,
            action.address().to_string(),
            verb.dimmed(),
            target(action).dimmed()
        );
    }

    let removals = plan
        .actions
        .iter()
        .filter(|a| matches!(a, Action::Delete { .. } | Action::Replace(_)))
        .count();

    println!("│");
    println!("├─────────────────────────────────────────────────────┤");
    println!(
        "│ Summary: {} changes ({} drop or revoke)",
        plan.len().to_string().bold(),
        removals.to_string().red()
    );
    println!("└─────────────────────────────────────────────────────┘");
}
