use std::error::Error;

use serde::Serialize;

use super::SchemasCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct SchemasResult {
    pub target: String,
    pub schemas: Vec<String>,
}

impl Execute for SchemasCmd {
    type Output = SchemasResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let schemas = ctx.block_on(ctx.service().list_schemas(id))?;

        Ok(SchemasResult {
            target: id.to_string(),
            schemas,
        })
    }
}
