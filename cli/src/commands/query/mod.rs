mod execute;
mod execute_tests;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Run a read statement; editable results carry their source table
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk query 'SELECT name FROM users'           # Key columns fetched but not shown
  pgdesk query 'SELECT dept, count(*) FROM emp GROUP BY dept'
  pgdesk query 'SELECT * FROM orders' -o json
")]
pub struct QueryCmd {
    /// SQL text to run
    pub sql: String,
}

impl CommandRunner for QueryCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
