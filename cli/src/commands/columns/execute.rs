use std::error::Error;

use db::ColumnDescriptor;
use serde::Serialize;

use super::ColumnsCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct ColumnsResult {
    pub schema: String,
    pub table: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl Execute for ColumnsCmd {
    type Output = ColumnsResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let columns = ctx.block_on(ctx.service().get_columns(id, &self.schema, &self.table))?;
        if columns.is_empty() {
            return Err(format!("Table not found: {}.{}", self.schema, self.table).into());
        }

        Ok(ColumnsResult {
            schema: self.schema,
            table: self.table,
            columns,
        })
    }
}
