//! Command definitions and implementations.
//!
//! Each command is defined in its own module with:
//! - The command struct with clap attributes for CLI parsing
//! - `execute.rs` building a serializable result through the database service
//! - `output.rs` rendering that result as a table

mod analyze;
mod browse;
mod columns;
mod edit;
mod exec;
mod ping;
mod query;
mod schemas;
mod tables;

pub use analyze::AnalyzeCmd;
pub use browse::BrowseCmd;
pub use columns::ColumnsCmd;
pub use edit::EditCmd;
pub use exec::ExecCmd;
pub use ping::PingCmd;
pub use query::QueryCmd;
pub use schemas::SchemasCmd;
pub use tables::TablesCmd;

use clap::Subcommand;
use enum_dispatch::enum_dispatch;
use std::error::Error;

use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Schema used when a command is not given `--schema`.
pub const DEFAULT_SCHEMA: &str = "public";

/// Trait for executing commands with command-specific result types.
pub trait Execute {
    type Output: Outputable;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>>;
}

/// Execute a command and format its result.
#[enum_dispatch]
pub trait CommandRunner {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>>;
}

#[derive(Subcommand, Debug)]
#[enum_dispatch(CommandRunner)]
pub enum Command {
    /// Connect to the target and check that it answers
    Ping(PingCmd),

    /// List the schemas of the connected database
    Schemas(SchemasCmd),

    /// List tables, views and other relations in a schema
    Tables(TablesCmd),

    /// Show a table's columns with types, nullability and key membership
    Columns(ColumnsCmd),

    /// Browse one page of a table's rows
    Browse(BrowseCmd),

    /// Run a read statement; editable results carry their source table
    Query(QueryCmd),

    /// Run a write statement and report affected rows
    Exec(ExecCmd),

    /// Report whether a statement's result could be edited (no connection)
    Analyze(AnalyzeCmd),

    /// Edit cells of a table page, preview the UPDATEs, optionally push them
    Edit(EditCmd),
}
