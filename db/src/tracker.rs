//! Pending cell edits and the UPDATE statements they turn into.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::escape::quote_ident;
use crate::types::TableRef;
use crate::value::CellValue;

/// One uncommitted cell change, valid only against the result set it was
/// captured from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingEdit {
    pub row: usize,
    pub column: usize,
    pub column_name: String,
    pub before: CellValue,
    pub after: CellValue,
    /// Key column/value pairs taken from the row when the edit was made.
    pub primary_key: Vec<(String, CellValue)>,
    pub table: TableRef,
}

impl PendingEdit {
    fn same_cell(&self, other: &PendingEdit) -> bool {
        self.row == other.row && self.column == other.column && self.table == other.table
    }

    /// Whether an UPDATE can be limited to this edit's row.
    pub fn is_scoped(&self) -> bool {
        !self.primary_key.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    Added,
    /// An existing edit for the same cell took the new value.
    Updated,
    /// The cell is back to its original value; its edit was dropped.
    Reverted,
    /// The candidate changed nothing.
    Ignored,
}

/// Ordered pending edits. Insertion order is statement order.
#[derive(Debug, Clone, Default)]
pub struct ChangeTracker {
    edits: Vec<PendingEdit>,
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_edit(&mut self, candidate: PendingEdit) -> EditOutcome {
        if let Some(index) = self.edits.iter().position(|e| e.same_cell(&candidate)) {
            if candidate.after == self.edits[index].before {
                self.edits.remove(index);
                return EditOutcome::Reverted;
            }
            self.edits[index].after = candidate.after;
            return EditOutcome::Updated;
        }

        if candidate.before == candidate.after {
            return EditOutcome::Ignored;
        }
        self.edits.push(candidate);
        EditOutcome::Added
    }

    pub fn remove_edit(&mut self, index: usize) -> Option<PendingEdit> {
        (index < self.edits.len()).then(|| self.edits.remove(index))
    }

    pub fn clear(&mut self) {
        self.edits.clear();
    }

    pub fn edits(&self) -> &[PendingEdit] {
        &self.edits
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// The not-yet-pushed value for a cell, if it has one.
    pub fn pending_value(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.edits
            .iter()
            .find(|e| e.row == row && e.column == column)
            .map(|e| &e.after)
    }

    pub fn generate_all_statements(&self) -> Vec<String> {
        self.edits.iter().map(generate_statement).collect()
    }

    /// The batch as reviewable text. The BEGIN/COMMIT framing is cosmetic;
    /// the push path sends bare statements.
    pub fn preview(&self, now: DateTime<Utc>) -> String {
        let mut out = format!(
            "-- {} pending edit{}\n-- Generated {}\nBEGIN;\n",
            self.edits.len(),
            if self.edits.len() == 1 { "" } else { "s" },
            now.to_rfc3339_opts(SecondsFormat::Secs, true)
        );
        for (i, edit) in self.edits.iter().enumerate() {
            out.push_str(&format!(
                "\n-- [{}] {} (row {}): {} -> {}\n{}\n",
                i + 1,
                quote_ident(&edit.column_name),
                edit.row,
                edit.before,
                edit.after,
                generate_statement(edit)
            ));
        }
        out.push_str("\nCOMMIT;\n");
        out
    }

    pub fn preview_sql(&self) -> String {
        self.preview(Utc::now())
    }
}

/// `UPDATE "s"."t" SET "c" = <lit> WHERE "pk" = <lit> AND ...;`, or a
/// commented error line when the edit carries no key values.
pub fn generate_statement(edit: &PendingEdit) -> String {
    if !edit.is_scoped() {
        return format!(
            "-- ERROR: cannot generate UPDATE for {} column {} (row {}): no primary key values captured",
            edit.table.qualified(),
            quote_ident(&edit.column_name),
            edit.row
        );
    }

    let predicates = edit
        .primary_key
        .iter()
        .map(|(column, value)| format!("{} = {}", quote_ident(column), value.sql_literal()))
        .collect::<Vec<_>>()
        .join(" AND ");

    format!(
        "UPDATE {} SET {} = {} WHERE {};",
        edit.table.qualified(),
        quote_ident(&edit.column_name),
        edit.after.sql_literal(),
        predicates
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    fn edit(row: usize, column: usize, before: &str, after: &str) -> PendingEdit {
        PendingEdit {
            row,
            column,
            column_name: "name".into(),
            before: CellValue::Text(before.into()),
            after: CellValue::Text(after.into()),
            primary_key: vec![("id".into(), CellValue::Integer(row as i64 + 1))],
            table: TableRef::new("public", "users"),
        }
    }

    #[fixture]
    fn tracker() -> ChangeTracker {
        ChangeTracker::new()
    }

    #[rstest]
    fn test_same_edit_twice_is_one_pending_edit(mut tracker: ChangeTracker) {
        assert_eq!(tracker.add_edit(edit(0, 1, "ada", "grace")), EditOutcome::Added);
        assert_eq!(tracker.add_edit(edit(0, 1, "ada", "grace")), EditOutcome::Updated);
        assert_eq!(tracker.len(), 1);
    }

    #[rstest]
    fn test_edit_then_inverse_removes_it(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(0, 1, "ada", "grace"));
        // The second edit sees the displayed value as its "before".
        assert_eq!(tracker.add_edit(edit(0, 1, "grace", "ada")), EditOutcome::Reverted);
        assert!(tracker.is_empty());
    }

    #[rstest]
    fn test_second_edit_updates_in_place(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(0, 1, "ada", "grace"));
        tracker.add_edit(edit(2, 1, "linus", "ken"));
        tracker.add_edit(edit(0, 1, "grace", "barbara"));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.edits()[0].before, CellValue::Text("ada".into()));
        assert_eq!(tracker.edits()[0].after, CellValue::Text("barbara".into()));
        assert_eq!(tracker.edits()[1].row, 2);
    }

    #[rstest]
    fn test_no_op_edit_ignored(mut tracker: ChangeTracker) {
        assert_eq!(tracker.add_edit(edit(0, 1, "ada", "ada")), EditOutcome::Ignored);
        assert!(tracker.is_empty());
    }

    #[rstest]
    fn test_same_cell_other_table_is_separate(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(0, 1, "ada", "grace"));
        let mut other = edit(0, 1, "ada", "grace");
        other.table = TableRef::new("archive", "users");
        assert_eq!(tracker.add_edit(other), EditOutcome::Added);
        assert_eq!(tracker.len(), 2);
    }

    #[rstest]
    fn test_remove_edit_bounds_checked(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(0, 1, "ada", "grace"));
        assert!(tracker.remove_edit(5).is_none());
        assert_eq!(tracker.remove_edit(0).unwrap().row, 0);
        assert!(tracker.is_empty());
    }

    #[rstest]
    fn test_pending_value(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(3, 1, "ada", "grace"));
        assert_eq!(
            tracker.pending_value(3, 1),
            Some(&CellValue::Text("grace".into()))
        );
        assert_eq!(tracker.pending_value(3, 0), None);
    }

    #[rstest]
    fn test_generate_statement_escapes_literals() {
        let statement = generate_statement(&edit(0, 1, "ada", "O'Brien"));
        assert_eq!(
            statement,
            "UPDATE \"public\".\"users\" SET \"name\" = 'O''Brien' WHERE \"id\" = 1;"
        );
    }

    #[rstest]
    fn test_generate_statement_composite_key_in_snapshot_order() {
        let mut e = edit(0, 1, "a", "b");
        e.primary_key = vec![
            ("tenant".into(), CellValue::Text("acme".into())),
            ("id".into(), CellValue::Integer(7)),
        ];
        assert_eq!(
            generate_statement(&e),
            "UPDATE \"public\".\"users\" SET \"name\" = 'b' WHERE \"tenant\" = 'acme' AND \"id\" = 7;"
        );
    }

    #[rstest]
    fn test_generate_statement_null_value() {
        let mut e = edit(0, 1, "a", "b");
        e.after = CellValue::Null;
        assert!(generate_statement(&e).contains("SET \"name\" = NULL WHERE"));
    }

    #[rstest]
    fn test_unscoped_edit_is_commented_marker() {
        let mut e = edit(4, 1, "a", "b");
        e.primary_key.clear();
        let statement = generate_statement(&e);
        assert!(statement.starts_with("-- ERROR: cannot generate UPDATE"));
        assert!(statement.contains("(row 4)"));
    }

    #[rstest]
    fn test_generate_all_in_insertion_order(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(5, 1, "e", "f"));
        tracker.add_edit(edit(1, 1, "a", "b"));
        let statements = tracker.generate_all_statements();
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("WHERE \"id\" = 6;"));
        assert!(statements[1].ends_with("WHERE \"id\" = 2;"));
    }

    #[rstest]
    fn test_preview_framing(mut tracker: ChangeTracker) {
        tracker.add_edit(edit(0, 1, "ada", "grace"));
        let now = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let preview = tracker.preview(now);
        let expected = "-- 1 pending edit\n\
                        -- Generated 2024-05-01T12:00:00Z\n\
                        BEGIN;\n\
                        \n\
                        -- [1] \"name\" (row 0): ada -> grace\n\
                        UPDATE \"public\".\"users\" SET \"name\" = 'grace' WHERE \"id\" = 1;\n\
                        \n\
                        COMMIT;\n";
        assert_eq!(preview, expected);
    }

    #[rstest]
    fn test_preview_empty(tracker: ChangeTracker) {
        let preview = tracker.preview_sql();
        assert!(preview.starts_with("-- 0 pending edits\n"));
        assert!(preview.ends_with("BEGIN;\n\nCOMMIT;\n"));
    }
}
