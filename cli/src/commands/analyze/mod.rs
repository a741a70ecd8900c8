mod cli_tests;
mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Report whether a statement's result could be edited (no connection)
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk analyze 'SELECT * FROM users u WHERE u.active'
  pgdesk analyze 'SELECT a.x FROM a JOIN b USING (id)'   # Read-only: multi-table
")]
pub struct AnalyzeCmd {
    /// SQL text to classify
    pub sql: String,
}

impl CommandRunner for AnalyzeCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
