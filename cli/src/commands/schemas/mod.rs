mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// List the schemas of the connected database
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk schemas                   # User schemas, system schemas excluded
  pgdesk schemas -o json           # As JSON
")]
pub struct SchemasCmd {}

impl CommandRunner for SchemasCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
