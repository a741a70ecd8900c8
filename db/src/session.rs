//! An edit session: one result set plus the edits made against it.

use tracing::{info, warn};

use crate::error::{DbError, Result};
use crate::service::DatabaseService;
use crate::tracker::{generate_statement, ChangeTracker, EditOutcome, PendingEdit};
use crate::types::ResultSet;
use crate::value::CellValue;

/// Owns the displayed `ResultSet` and its `ChangeTracker`.
///
/// Row and column indices in edits refer to this result only, so replacing
/// the result drops every pending edit.
#[derive(Debug, Clone)]
pub struct EditSession {
    result: ResultSet,
    tracker: ChangeTracker,
}

impl EditSession {
    pub fn new(result: ResultSet) -> Self {
        Self {
            result,
            tracker: ChangeTracker::new(),
        }
    }

    pub fn result(&self) -> &ResultSet {
        &self.result
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.tracker.is_empty()
    }

    /// Swap in a new page or query result. Pending edits are discarded.
    pub fn replace_result(&mut self, result: ResultSet) {
        if !self.tracker.is_empty() {
            info!(discarded = self.tracker.len(), "result replaced, dropping pending edits");
        }
        self.tracker.clear();
        self.result = result;
    }

    pub fn record_edit(&mut self, row: usize, column: usize, value: CellValue) -> Result<EditOutcome> {
        let Some(table) = self.result.source.clone().filter(|_| self.result.is_editable()) else {
            return Err(DbError::NotEditable {
                reason: "result has no source table with a primary key".to_string(),
            });
        };

        let descriptor = self.result.columns.get(column).ok_or_else(|| {
            DbError::invalid_argument(format!("column {} is out of range", column))
        })?;
        if descriptor.hidden {
            return Err(DbError::invalid_argument(format!(
                "column '{}' is not displayed",
                descriptor.name
            )));
        }
        let before = self
            .result
            .cell(row, column)
            .cloned()
            .ok_or_else(|| DbError::invalid_argument(format!("row {} is out of range", row)))?;

        Ok(self.tracker.add_edit(PendingEdit {
            row,
            column,
            column_name: descriptor.name.clone(),
            before,
            after: value,
            primary_key: self.result.primary_key_snapshot(row),
            table,
        }))
    }

    /// Record operator-typed text, parsed for the column's type.
    pub fn record_input(&mut self, row: usize, column: usize, input: &str) -> Result<EditOutcome> {
        let type_name = self
            .result
            .columns
            .get(column)
            .map(|c| c.type_name.clone())
            .unwrap_or_default();
        self.record_edit(row, column, CellValue::parse_input(input, &type_name))
    }

    pub fn rollback_edit(&mut self, index: usize) -> Option<PendingEdit> {
        self.tracker.remove_edit(index)
    }

    pub fn rollback_all(&mut self) {
        self.tracker.clear();
    }

    pub fn preview_sql(&self) -> String {
        self.tracker.preview_sql()
    }

    /// The pending value for a cell if it has one, else the fetched value.
    pub fn displayed_value(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.tracker
            .pending_value(row, column)
            .or_else(|| self.result.cell(row, column))
    }

    /// Execute the pending edits one statement at a time.
    ///
    /// Nothing is sent if any edit lacks key values. The first failing
    /// statement, or one that matches no row, stops the push: edits already
    /// applied leave the tracker (and are written into the result), the rest
    /// stay pending. There is no surrounding transaction.
    pub async fn push_changes(&mut self, service: &DatabaseService, target_id: &str) -> Result<usize> {
        if let Some(edit) = self.tracker.edits().iter().find(|e| !e.is_scoped()) {
            return Err(DbError::UnsafeEdit {
                column: edit.column_name.clone(),
                row: edit.row,
            });
        }

        let total = self.tracker.len();
        let mut applied = 0;
        while let Some(edit) = self.tracker.edits().first().cloned() {
            let statement = generate_statement(&edit);
            let outcome = match service.execute_statement(target_id, &statement).await {
                Ok(0) => Err(DbError::RowNotMatched {
                    column: edit.column_name.clone(),
                    row: edit.row,
                }),
                Ok(_) => Ok(()),
                Err(source) => Err(source),
            };
            if let Err(source) = outcome {
                warn!(target_id, applied, total, error = %source, "push aborted");
                return Err(DbError::PartialPush {
                    applied,
                    total,
                    source: Box::new(source),
                });
            }

            self.tracker.remove_edit(0);
            if let Some(cell) = self
                .result
                .rows
                .get_mut(edit.row)
                .and_then(|row| row.get_mut(edit.column))
            {
                *cell = edit.after;
            }
            applied += 1;
        }

        info!(target_id, applied, "pushed edits");
        Ok(applied)
    }
}
