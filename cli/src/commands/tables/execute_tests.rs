//! Execute tests for tables command.

#[cfg(test)]
mod tests {
    use super::super::TablesCmd;
    use crate::commands::Execute;
    use crate::context::mock_context;
    use db::test_utils::{raw_result, text, MockConnector};
    use db::TableKind;
    use rstest::rstest;

    #[rstest]
    fn test_lists_relations_with_kinds() {
        let mock = MockConnector::new();
        mock.push_rows(raw_result(
            &[("name", "text"), ("kind", "text")],
            vec![
                vec![text("orders"), text("r")],
                vec![text("recent_orders"), text("v")],
            ],
        ));
        let ctx = mock_context(&mock);

        let result = TablesCmd {
            schema: "sales".to_string(),
        }
        .execute(&ctx)
        .unwrap();

        assert_eq!(result.tables.len(), 2);
        assert_eq!(result.tables[1].kind, TableKind::View);
        assert!(result.tables.iter().all(|t| t.schema == "sales"));
        assert!(mock.executed()[0].contains("'sales'"));
    }
}
