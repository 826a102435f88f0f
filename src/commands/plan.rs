use anyhow::Result;
use colored::Colorize;

use crate::Context;
use crate::cli::PlanArgs;
use crate::config;
use crate::resource::{self, FingerprintKey};
use crate::schema::Manifest;
use crate::ui;

/// Print the statements each declared resource would be created with.
/// Never connects to the store; secret values are masked.
pub fn run(ctx: &Context, args: &PlanArgs) -> Result<()> {
    let path = config::manifest_path(args.manifest.file.as_deref())?;
    let manifest = Manifest::load(&path)?;
    // Fingerprints are not shown, so a throwaway key will do
    let resources = resource::resolve(&manifest, &FingerprintKey::generate())?;

    if !ctx.quiet {
        ui::header(&format!("Plan for region {}", manifest.region));
    }

    for resource in &resources {
        ui::section(&resource.address.to_string());
        for statement in resource.definition.preview()? {
            println!("  {}", statement.dimmed());
        }
    }

    if !ctx.quiet {
        println!();
        ui::info(&format!("{} resources declared", resources.len()));
    }
    Ok(())
}
