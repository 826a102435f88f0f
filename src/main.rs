mod cli;
mod commands;
mod config;
mod engine;
mod resource;
mod runner;
mod schema;
mod state;
mod ui;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::generate;
use cli::{Cli, Command, StateCommand};
use std::io;

/// Global context for the application
pub struct Context {
    pub quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let ctx = Context { quiet: cli.quiet };

    match cli.command {
        Command::Plan(args) => commands::plan::run(&ctx, &args),
        Command::Apply(args) => commands::apply::run(&ctx, &args),
        Command::Refresh(args) => commands::refresh::run(&ctx, &args),
        Command::Destroy(args) => commands::apply::destroy(&ctx, &args),
        Command::State(cmd) => match cmd {
            StateCommand::Show(args) => commands::state::show(&ctx, &args),
            StateCommand::Rm { address, state } => commands::state::rm(&ctx, &address, &state),
        },
        Command::Completions { shell } => {
            let mut cmd = Cli::command();
            generate(shell, &mut cmd, "mzconverge", &mut io::stdout());
            Ok(())
        }
    }
}
