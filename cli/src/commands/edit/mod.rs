mod execute;
mod output;

use std::error::Error;

use clap::Args;

use crate::commands::{CommandRunner, Execute, DEFAULT_SCHEMA};
use crate::context::Context;
use crate::output::{OutputFormat, Outputable};

/// One `--set ROW:COLUMN=VALUE` argument. Rows count from 1 within the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellAssignment {
    pub row: usize,
    pub column: String,
    pub value: String,
}

/// Parse `ROW:COLUMN=VALUE`. The value may contain `=` and `:`; the literal
/// text `NULL` sets a null.
pub fn parse_assignment(input: &str) -> Result<CellAssignment, String> {
    let (cell, value) = input
        .split_once('=')
        .ok_or_else(|| format!("expected ROW:COLUMN=VALUE, got '{}'", input))?;
    let (row, column) = cell
        .split_once(':')
        .ok_or_else(|| format!("expected ROW:COLUMN before '=', got '{}'", cell))?;

    let row: usize = row
        .trim()
        .parse()
        .map_err(|_| format!("row must be a positive number, got '{}'", row))?;
    if row == 0 {
        return Err("rows are numbered from 1".to_string());
    }
    let column = column.trim();
    if column.is_empty() {
        return Err("column name is empty".to_string());
    }

    Ok(CellAssignment {
        row,
        column: column.to_string(),
        value: value.to_string(),
    })
}

/// Edit cells of a table page, preview the UPDATEs, optionally push them
#[derive(Args, Debug)]
#[command(after_help = "\
Examples:
  pgdesk edit users --set 1:name=Ada                   # Preview one UPDATE
  pgdesk edit users --set 1:name=Ada --set 2:age=37 --push
  pgdesk edit users --page 3 --set 5:email=NULL --push # Row 5 of page 3
")]
pub struct EditCmd {
    /// Table name
    pub table: String,

    /// Schema containing the table
    #[arg(short, long, default_value = DEFAULT_SCHEMA)]
    pub schema: String,

    /// Page the row numbers refer to
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u64).range(1..))]
    pub page: u64,

    /// Rows per page (1-10000)
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..=10000))]
    pub page_size: u64,

    /// Cell change as ROW:COLUMN=VALUE (repeatable)
    #[arg(long = "set", value_name = "ROW:COLUMN=VALUE", required = true, value_parser = parse_assignment)]
    pub assignments: Vec<CellAssignment>,

    /// Execute the generated UPDATEs instead of only previewing them
    #[arg(long)]
    pub push: bool,
}

impl CommandRunner for EditCmd {
    fn run(self, ctx: &Context, format: OutputFormat) -> Result<String, Box<dyn Error>> {
        let result = self.execute(ctx)?;
        Ok(result.format(format))
    }
}
