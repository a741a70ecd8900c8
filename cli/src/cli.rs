//! CLI argument definitions.
//!
//! This module contains the top-level CLI structure and shared types.
//! Individual command definitions are in the `commands` module.

use clap::Parser;
use std::path::PathBuf;

use crate::commands::Command;
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the connection config file
    ///
    /// If not specified, searches for config in:
    ///   1. .pgdesk.json (project-local)
    ///   2. ~/.pgdesk/config.json (user-global)
    ///
    /// and falls back to the PGDESK_URL environment variable.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Connection target id from the config (defaults to the config's
    /// default_target, then the first target)
    #[arg(short = 't', long, global = true)]
    pub target: Option<String>,

    /// Output format
    #[arg(short = 'o', long, value_enum, default_value_t = OutputFormat::Table, global = true)]
    pub format: OutputFormat,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}
