mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Connect to the target and check that it answers
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk ping                      # Check the default target
  pgdesk --target staging ping     # Check a named target
")]
pub struct PingCmd {}

impl CommandRunner for PingCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
