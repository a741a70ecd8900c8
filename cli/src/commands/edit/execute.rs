use std::error::Error;

use db::{EditSession, PendingEdit, TableRef};
use serde::Serialize;
use tracing::debug;

use super::EditCmd;
use crate::commands::Execute;
use crate::context::Context;

#[derive(Debug, Clone, Serialize)]
pub struct EditResult {
    pub table: TableRef,
    pub page: u64,
    pub edits: Vec<PendingEdit>,
    /// The UPDATE script for `edits`, wrapped in BEGIN/COMMIT.
    pub preview: String,
    /// Statements executed, when `--push` was given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pushed: Option<usize>,
}

impl Execute for EditCmd {
    type Output = EditResult;

    fn execute(self, ctx: &Context) -> Result<Self::Output, Box<dyn Error>> {
        let id = ctx.connect()?;
        let page = ctx.block_on(ctx.service().load_table_page(
            id,
            &self.schema,
            &self.table,
            self.page,
            self.page_size,
            None,
        ))?;
        let mut session = EditSession::new(page);

        for assignment in &self.assignments {
            let rows = session.result().row_count();
            if assignment.row > rows {
                return Err(format!(
                    "Row {} is not on page {} ({} row(s))",
                    assignment.row, self.page, rows
                )
                .into());
            }
            let column = session
                .result()
                .column_index(&assignment.column)
                .ok_or_else(|| {
                    format!(
                        "Unknown column '{}' in {}.{}",
                        assignment.column, self.schema, self.table
                    )
                })?;
            let outcome = session.record_input(assignment.row - 1, column, &assignment.value)?;
            debug!(row = assignment.row, column = %assignment.column, ?outcome, "recorded edit");
        }

        let edits = session.tracker().edits().to_vec();
        let preview = session.preview_sql();
        let pushed = if self.push && !edits.is_empty() {
            Some(ctx.block_on(session.push_changes(ctx.service(), id))?)
        } else {
            None
        };

        Ok(EditResult {
            table: TableRef::new(self.schema, self.table),
            page: self.page,
            edits,
            preview,
            pushed,
        })
    }
}
