//! Command dispatch logic for dijkstep

use std::time::Instant;

use dijkstep_core::error::Result;
use tracing::debug;

use crate::cli::{Cli, Commands};
use crate::commands::{check, play, walk};

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub start: Instant,
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// Prints version and usage hint when no subcommand is given
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("dijkstep {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Step-by-step Dijkstra shortest paths.");
        println!();
        println!("Run `dijkstep --help` for usage information.");
        Ok(())
    }
}

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Walk { graph, source } => walk::execute(ctx, graph, source.as_deref()),
            Commands::Play {
                graph,
                source,
                tick_ms,
            } => play::execute(ctx, graph, source.as_deref(), *tick_ms),
            Commands::Check { graph } => check::execute(ctx, graph),
        }
    }
}

pub fn run(cli: &Cli, start: Instant) -> Result<()> {
    let ctx = CommandContext { cli, start };

    let result = match &cli.command {
        None => NoCommand.execute(&ctx),
        Some(cmd) => cmd.execute(&ctx),
    };

    debug!(elapsed = ?start.elapsed(), "command_finished");
    result
}
