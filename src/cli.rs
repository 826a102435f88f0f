use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mzconverge")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(
    about = "Converge Materialize connections, secrets and grants to a manifest",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show the statements every declared object would be created with
    Plan(PlanArgs),

    /// Create, update and remove objects until the store matches the manifest
    Apply(ApplyArgs),

    /// Re-read tracked objects and forget the ones removed outside mzconverge
    Refresh(RefreshArgs),

    /// Remove every tracked object and grant
    Destroy(DestroyArgs),

    /// Inspect or edit the state file
    #[command(subcommand)]
    State(StateCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

// ============================================================================
// Shared argument groups
// ============================================================================

#[derive(Args)]
pub struct ManifestArgs {
    /// Manifest file (default: ~/.config/mzconverge/mzconverge.toml)
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

#[derive(Args)]
pub struct StateArgs {
    /// State file (default: ~/.local/state/mzconverge/state.toml)
    #[arg(long)]
    pub state: Option<PathBuf>,
}

#[derive(Args)]
pub struct ConnectionArgs {
    /// Connection URL, overrides the manifest's [connection] url
    #[arg(long, env = "MZCONVERGE_URL", hide_env_values = true)]
    pub url: Option<String>,
}

// ============================================================================
// Commands
// ============================================================================

#[derive(Parser)]
pub struct PlanArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

#[derive(Parser)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Show what would change without touching the store
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser)]
pub struct RefreshArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

#[derive(Parser)]
pub struct DestroyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    #[command(flatten)]
    pub state: StateArgs,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Show what would be removed without touching the store
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Skip confirmation prompts
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Subcommand)]
pub enum StateCommand {
    /// List tracked resources
    Show(StateArgs),

    /// Forget a resource without touching the store
    Rm {
        /// Resource address, e.g. connection_kafka.k1
        address: String,

        #[command(flatten)]
        state: StateArgs,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_apply() {
        let cli = Cli::parse_from([
            "mzconverge",
            "-vv",
            "apply",
            "--file",
            "m.toml",
            "--dry-run",
            "--yes",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Apply(args) => {
                assert_eq!(args.manifest.file, Some(PathBuf::from("m.toml")));
                assert!(args.dry_run);
                assert!(args.yes);
                assert!(args.state.state.is_none());
            }
            _ => panic!("expected apply"),
        }
    }

    #[test]
    fn test_parse_state_rm() {
        let cli = Cli::parse_from(["mzconverge", "state", "rm", "secret.pw", "--state", "s.toml"]);
        match cli.command {
            Command::State(StateCommand::Rm { address, state }) => {
                assert_eq!(address, "secret.pw");
                assert_eq!(state.state, Some(PathBuf::from("s.toml")));
            }
            _ => panic!("expected state rm"),
        }
    }
}
