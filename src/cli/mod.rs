//! CLI argument parsing for dijkstep
//!
//! Global flags: --format, --quiet, --verbose, --log-level, --log-json

pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use output::OutputFormat;

/// Dijkstep - watch Dijkstra's algorithm settle a graph one vertex at a time
#[derive(Parser, Debug)]
#[command(name = "dijkstep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    /// Only print the final distances
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log filter (e.g. `debug` or `dijkstep_core=trace`)
    #[arg(long, global = true, env = "DIJKSTEP_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Write logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Step through a graph without delays, printing every event
    Walk {
        /// Graph file (TOML)
        graph: PathBuf,

        /// Source vertex (defaults to the file's `source`)
        #[arg(long, short)]
        source: Option<String>,
    },

    /// Play a graph on a timer until it ends or Ctrl-C is pressed
    Play {
        /// Graph file (TOML)
        graph: PathBuf,

        /// Source vertex (defaults to the file's `source`)
        #[arg(long, short)]
        source: Option<String>,

        /// Milliseconds between steps (defaults to the file's `tick_ms`)
        #[arg(long)]
        tick_ms: Option<u64>,
    },

    /// Validate a graph file and print a summary
    Check {
        /// Graph file (TOML)
        graph: PathBuf,
    },
}
