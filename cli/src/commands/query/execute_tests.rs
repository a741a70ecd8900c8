//! Execute tests for query command.

#[cfg(test)]
mod tests {
    use super::super::QueryCmd;
    use crate::commands::Execute;
    use crate::context::mock_context;
    use db::test_utils::{int4, raw_result, text, text_column, MockConnector};
    use db::{CellValue, TableRef};
    use rstest::rstest;

    fn cmd(sql: &str) -> QueryCmd {
        QueryCmd {
            sql: sql.to_string(),
        }
    }

    #[rstest]
    fn test_backfilled_key_is_not_displayed() {
        let mock = MockConnector::new();
        mock.push_rows(text_column("name", &["id"]));
        mock.push_rows(raw_result(
            &[("id", "int4"), ("name", "text")],
            vec![vec![int4(1), text("ada")], vec![int4(2), text("grace")]],
        ));
        let ctx = mock_context(&mock);

        let result = cmd("SELECT name FROM users").execute(&ctx).unwrap();

        assert!(result.editable);
        assert_eq!(result.source, Some(TableRef::new("public", "users")));
        assert_eq!(result.grid.columns.len(), 1);
        assert_eq!(result.grid.columns[0].name, "name");
        assert_eq!(result.grid.rows[1], vec![CellValue::Text("grace".into())]);
        assert_eq!(result.row_count, 2);
    }

    #[rstest]
    fn test_read_only_reason_from_analysis() {
        let mock = MockConnector::new();
        mock.push_rows(raw_result(&[("n", "int4")], vec![vec![int4(3)]]));
        let ctx = mock_context(&mock);

        let result = cmd("SELECT a.x FROM a JOIN b ON a.id = b.id")
            .execute(&ctx)
            .unwrap();

        assert!(!result.editable);
        assert_eq!(
            result.reason.as_deref(),
            Some("multi-table statements cannot be edited")
        );
    }

    #[rstest]
    fn test_read_only_reason_without_key() {
        let mock = MockConnector::new();
        mock.push_rows(text_column("name", &[]));
        mock.push_rows(raw_result(&[("line", "text")], vec![vec![text("boot")]]));
        let ctx = mock_context(&mock);

        let result = cmd("SELECT line FROM logs").execute(&ctx).unwrap();

        assert!(!result.editable);
        assert_eq!(result.reason.as_deref(), Some("no usable primary key in the result"));
    }
}
