//! Output formatting for table pages.

use super::execute::BrowseResult;
use crate::output::Outputable;

impl Outputable for BrowseResult {
    fn to_table(&self) -> String {
        let mut lines = vec![
            format!(
                "{}.{}: page {} of {} ({} row(s), {} per page)",
                self.table.schema,
                self.table.table,
                self.page,
                self.total_pages,
                self.total_rows,
                self.page_size
            ),
            if self.editable {
                format!("Editable (key: {})", self.primary_key.join(", "))
            } else {
                "Read-only (no primary key)".to_string()
            },
            String::new(),
        ];

        if self.grid.rows.is_empty() {
            lines.push("No rows.".to_string());
        } else {
            lines.push(self.grid.to_table());
        }
        lines.join("\n")
    }
}
