use std::error::Error;

use serde::Serialize;

use super::ExecCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct ExecResult {
    pub affected_rows: u64,
}

impl Execute for ExecCmd {
    type Output = ExecResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let affected_rows = ctx.block_on(ctx.service().execute_statement(id, &self.sql))?;
        Ok(ExecResult { affected_rows })
    }
}
