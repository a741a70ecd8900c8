mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Run a write statement and report affected rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk exec \"DELETE FROM sessions WHERE expires_at < now()\"
  pgdesk exec 'CREATE INDEX ON orders (customer_id)'
")]
pub struct ExecCmd {
    /// SQL text to run
    pub sql: String,
}

impl CommandRunner for ExecCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
