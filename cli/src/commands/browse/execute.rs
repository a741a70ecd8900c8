use std::error::Error;

use db::{SortSpec, TableRef};
use serde::Serialize;

use super::BrowseCmd;
use crate::commands::Execute;
use crate::context::Context;
use crate::output::GridView;

#[derive(Debug, Clone, Serialize)]
pub struct BrowseResult {
    pub table: TableRef,
    pub page: u64,
    pub total_pages: u64,
    pub page_size: u64,
    pub total_rows: u64,
    pub editable: bool,
    pub primary_key: Vec<String>,
    #[serde(flatten)]
    pub grid: GridView,
}

impl BrowseCmd {
    pub(crate) fn sort_spec(&self) -> Option<SortSpec> {
        self.sort.as_ref().map(|column| {
            if self.desc {
                SortSpec::descending(column.clone())
            } else {
                SortSpec::ascending(column.clone())
            }
        })
    }
}

impl Execute for BrowseCmd {
    type Output = BrowseResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let sort = self.sort_spec();
        let result = ctx.block_on(ctx.service().load_table_page(
            id,
            &self.schema,
            &self.table,
            self.page,
            self.page_size,
            sort.as_ref(),
        ))?;

        Ok(BrowseResult {
            table: TableRef::new(self.schema, self.table),
            page: result.page,
            total_pages: result.total_pages(),
            page_size: result.page_size,
            total_rows: result.total_rows,
            editable: result.is_editable(),
            primary_key: result.primary_key_columns.clone(),
            grid: GridView::from_result(&result),
        })
    }
}
