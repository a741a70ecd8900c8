use std::error::Error;

use db::TableRef;
use serde::Serialize;

use super::QueryCmd;
use crate::commands::Execute;
use crate::context::Context;
use crate::output::GridView;

const NO_KEY_REASON: &str = "no usable primary key in the result";

#[derive(Debug, Clone, Serialize)]
pub struct QueryResult {
    pub row_count: usize,
    pub editable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<TableRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(flatten)]
    pub grid: GridView,
}

impl Execute for QueryCmd {
    type Output = QueryResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let result = ctx.block_on(ctx.service().execute_query(id, &self.sql))?;

        let editable = result.is_editable();
        let reason = if editable {
            None
        } else {
            Some(
                ctx.service()
                    .analyze(&self.sql)
                    .reason()
                    .unwrap_or(NO_KEY_REASON)
                    .to_string(),
            )
        };

        Ok(QueryResult {
            row_count: result.row_count(),
            editable,
            source: result.source.clone(),
            reason,
            grid: GridView::from_result(&result),
        })
    }
}
