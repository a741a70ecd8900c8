use std::error::Error;

use db::TableDescriptor;
use serde::Serialize;

use super::TablesCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct TablesResult {
    pub schema: String,
    pub tables: Vec<TableDescriptor>,
}

impl Execute for TablesCmd {
    type Output = TablesResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let tables = ctx.block_on(ctx.service().list_tables(id, &self.schema))?;

        Ok(TablesResult {
            schema: self.schema,
            tables,
        })
    }
}
