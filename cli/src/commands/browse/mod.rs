mod cli_tests;
mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute, DEFAULT_SCHEMA};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// Browse one page of a table's rows
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk browse users                        # First 50 rows of public.users
  pgdesk browse users --page 3 --page-size 20
  pgdesk browse orders --sort created_at --desc
  pgdesk browse invoices -s billing -o json
")]
pub struct BrowseCmd {
    /// Table name
    pub table: String,

    /// Schema containing the table
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    /// Page number, starting at 1
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Rows per page (1-10000)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..=10000))]
    pub page_size: u64,

    /// Column to order by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending (requires --sort)
    #[arg(long, requires = "sort")]
    pub desc: bool,
}

impl CommandRunner for BrowseCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
