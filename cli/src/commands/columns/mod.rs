mod execute;
mod execute_tests;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute, DEFAULT_SCHEMA};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Show a table's columns with types, nullability and key membership
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk columns users                   # Columns of public.users
  pgdesk columns invoices -s billing     # Columns of billing.invoices
")]
pub struct ColumnsCmd {
    /// Table name
    pub table: String,

    /// Schema containing the table
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,
}

impl CommandRunner for ColumnsCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
