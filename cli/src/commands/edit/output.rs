//! Output formatting for edit previews and pushes.

use super::execute::EditResult;
use crate::output::Outputable;

impl Outputable for EditResult {
    fn to_table(&self) -> String {
        let mut lines = vec![format!(
            "{}.{} page {}: {} pending edit(s)",
            self.table.schema,
            self.table.table,
            self.page,
            self.edits.len()
        )];

        if self.edits.is_empty() {
            lines.push(String::new());
            lines.push("No changes to apply.".to_string());
            return lines.join("\n");
        }

        lines.push(String::new());
        lines.push(self.preview.trim_end().to_string());
        lines.push(String::new());
        lines.push(match self.pushed {
            Some(count) => format!("Pushed {} statement(s).", count),
            None => "Not pushed (use --push to apply).".to_string(),
        });
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use db::{CellValue, PendingEdit, TableRef};
    use rstest::{fixture, rstest};

    fn rename_edit() -> PendingEdit {
        PendingEdit {
            row: 0,
            column: 1,
            column_name: "name".to_string(),
            before: CellValue::Text("ada".into()),
            after: CellValue::Text("lovelace".into()),
            primary_key: vec![("id".to_string(), CellValue::Integer(1))],
            table: TableRef::new("public", "users"),
        }
    }

    #[fixture]
    fn preview_result() -> EditResult {
        EditResult {
            table: TableRef::new("public", "users"),
            page: 1,
            edits: vec![rename_edit()],
            preview: "BEGIN;\nUPDATE \"public\".\"users\" SET \"name\" = 'lovelace' WHERE \"id\" = 1;\nCOMMIT;\n"
                .to_string(),
            pushed: None,
        }
    }

    #[fixture]
    fn pushed_result() -> EditResult {
        EditResult {
            pushed: Some(1),
            ..preview_result()
        }
    }

    #[fixture]
    fn no_changes() -> EditResult {
        EditResult {
            table: TableRef::new("public", "users"),
            page: 2,
            edits: vec![],
            preview: String::new(),
            pushed: None,
        }
    }

    crate::output_table_contains_test! {
        test_name: test_to_table_preview,
        fixture: preview_result,
        fixture_type: EditResult,
        contains: [
            "public.users page 1: 1 pending edit(s)",
            "SET \"name\" = 'lovelace' WHERE \"id\" = 1;",
            "Not pushed",
        ],
    }

    crate::output_table_contains_test! {
        test_name: test_to_table_pushed,
        fixture: pushed_result,
        fixture_type: EditResult,
        contains: ["Pushed 1 statement(s)."],
    }

    crate::output_table_test! {
        test_name: test_to_table_no_changes,
        fixture: no_changes,
        fixture_type: EditResult,
        expected: "public.users page 2: 0 pending edit(s)\n\nNo changes to apply.",
    }

    crate::output_json_test! {
        test_name: test_format_json,
        fixture: pushed_result,
        fixture_type: EditResult,
        assertions: {
            "pushed": 1,
            "page": 1,
        },
    }
}
