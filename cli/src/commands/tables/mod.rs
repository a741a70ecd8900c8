mod execute;
mod execute_tests;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute, DEFAULT_SCHEMA};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// List tables, views and other relations in a schema
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk tables                    # Relations in the public schema
  pgdesk tables --schema billing   # Relations in another schema
")]
pub struct TablesCmd {
    /// Schema to list
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,
}

impl CommandRunner for TablesCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
