use anyhow::{Context as AnyhowContext, Result, bail};

use crate::Context;
use crate::cli::StateArgs;
use crate::resource::Address;
use crate::state::ConvergeState;
use crate::ui;

/// List tracked resources
pub fn show(_ctx: &Context, args: &StateArgs) -> Result<()> {
    let path = ConvergeState::path(args.state.as_deref())?;
    let state = ConvergeState::load_from(&path)?;

    ui::header("Tracked Resources");
    ui::kv("State", &path.display().to_string());
    ui::kv("Region", ui::or_dash(state.region.as_deref()));
    ui::kv("Updated", &state.last_updated.to_rfc3339());

    if state.resources.is_empty() {
        println!();
        ui::info("Nothing tracked");
        return Ok(());
    }

    for (address, tracked) in &state.resources {
        ui::section(&address.to_string());
        ui::kv("name", &tracked.qualified_name);
        ui::kv("identity", &tracked.identity);
        ui::kv("owner", ui::or_dash(tracked.ownership_role.as_deref()));
        ui::kv("comment", ui::or_dash(tracked.comment.as_deref()));
    }
    Ok(())
}

/// Forget a resource without touching the store
pub fn rm(ctx: &Context, address: &str, args: &StateArgs) -> Result<()> {
    let address: Address = address
        .parse()
        .with_context(|| format!("Invalid address: {address}"))?;
    let path = ConvergeState::path(args.state.as_deref())?;
    let mut state = ConvergeState::load_from(&path)?;

    let Some(tracked) = state.untrack(&address) else {
        bail!("{address} is not tracked");
    };
    state.save_to(&path)?;

    if !ctx.quiet {
        ui::success(&format!("Forgot {address} ({})", tracked.identity));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::ResourceType;
    use crate::state::TrackedResource;
    use chrono::Utc;

    #[test]
    fn test_rm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.toml");
        let now = Utc::now();
        let mut state = ConvergeState::default();
        state.track(
            Address::new(ResourceType::Secret, "pw"),
            TrackedResource {
                identity: "r:u1".into(),
                qualified_name: "pw".into(),
                fingerprint: String::new(),
                ownership_role: None,
                comment: None,
                created_at: now,
                updated_at: now,
                grant: None,
            },
        );
        state.save_to(&path).unwrap();

        let ctx = Context { quiet: true };
        let args = StateArgs {
            state: Some(path.clone()),
        };
        rm(&ctx, "secret.pw", &args).unwrap();
        assert!(ConvergeState::load_from(&path).unwrap().resources.is_empty());
        assert!(rm(&ctx, "secret.pw", &args).is_err());
        assert!(rm(&ctx, "bogus", &args).is_err());
    }
}
