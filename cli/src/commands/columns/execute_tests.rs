//! Execute tests for columns command.

#[cfg(test)]
mod tests {
    use super::super::ColumnsCmd;
    use crate::commands::Execute;
    use crate::context::mock_context;
    use db::test_utils::{boolean, raw_result, text, MockConnector};
    use rstest::rstest;

    fn cmd(table: &str) -> ColumnsCmd {
        ColumnsCmd {
            table: table.to_string(),
            schema: "public".to_string(),
        }
    }

    #[rstest]
    fn test_reads_column_metadata() {
        let mock = MockConnector::new();
        mock.push_rows(raw_result(
            &[
                ("name", "text"),
                ("type_name", "text"),
                ("nullable", "bool"),
                ("is_primary_key", "bool"),
            ],
            vec![
                vec![text("id"), text("int8"), boolean(false), boolean(true)],
                vec![text("note"), text("text"), boolean(true), boolean(false)],
            ],
        ));
        let ctx = mock_context(&mock);

        let result = cmd("users").execute(&ctx).unwrap();

        assert_eq!(result.columns.len(), 2);
        assert!(result.columns[0].is_primary_key);
        assert!(!result.columns[0].nullable);
        assert_eq!(result.columns[1].ordinal, 1);
    }

    #[rstest]
    fn test_unknown_table_is_an_error() {
        let mock = MockConnector::new();
        let ctx = mock_context(&mock);

        let err = cmd("nope").execute(&ctx).unwrap_err();

        assert!(err.to_string().contains("Table not found: public.nope"));
    }
}
