//! Output formatting for query results.

use super::execute::QueryResult;
use crate::output::Outputable;

impl Outputable for QueryResult {
    fn to_table(&self) -> String {
        let status = match (&self.source, &self.reason) {
            (Some(table), None) => format!("Editable: {}.{}", table.schema, table.table),
            (_, Some(reason)) => format!("Read-only: {}", reason),
            (None, None) => "Read-only".to_string(),
        };

        let mut lines = vec![format!("{} row(s)", self.row_count), status, String::new()];
        if self.grid.columns.is_empty() {
            lines.push("No columns.".to_string());
        } else {
            lines.push(self.grid.to_table());
        }
        lines.join("\n")
    }
}
