//! Paginated table reads.

use tracing::debug;

use crate::error::{DbError, Result};
use crate::manager::ConnectionManager;
use crate::queries::catalog::{get_columns, get_row_count, primary_key_columns};
use crate::queries::run_query;
use crate::query_builders::PageQueryBuilder;
use crate::types::{total_pages, validate_page, ResultSet, SortSpec, TableRef};
use crate::value::CellValue;

fn check_page_arguments(page: u64, page_size: u64) -> Result<()> {
    if page < 1 {
        return Err(DbError::invalid_argument("page must be at least 1"));
    }
    if page_size < 1 {
        return Err(DbError::invalid_argument("page size must be at least 1"));
    }
    Ok(())
}

/// One page of rows. An empty `columns` slice selects `*`.
///
/// Invalid page arguments are rejected before anything is sent.
pub async fn fetch_page(
    manager: &ConnectionManager,
    target_id: &str,
    table: &TableRef,
    columns: &[String],
    page: u64,
    page_size: u64,
    sort: Option<&SortSpec>,
) -> Result<Vec<Vec<CellValue>>> {
    check_page_arguments(page, page_size)?;

    let sql = PageQueryBuilder::new(table)
        .with_columns(columns)
        .with_sort(sort)
        .paginate(page, page_size)
        .build();

    let (_, rows) = run_query(manager, target_id, sql).await?.decode();
    Ok(rows)
}

/// Columns, key, total count and one page of a table as a `ResultSet`.
///
/// A page outside `[1, total_pages]` fails with `InvalidPage` before the
/// page itself is fetched.
pub async fn load_table_page(
    manager: &ConnectionManager,
    target_id: &str,
    table: &TableRef,
    page: u64,
    page_size: u64,
    sort: Option<&SortSpec>,
) -> Result<ResultSet> {
    if page_size < 1 {
        return Err(DbError::invalid_argument("page size must be at least 1"));
    }

    let columns = get_columns(manager, target_id, table).await?;
    if let Some(sort) = sort {
        if !columns.iter().any(|c| c.name == sort.column) {
            return Err(DbError::invalid_argument(format!(
                "cannot sort by unknown column '{}'",
                sort.column
            )));
        }
    }

    let key = primary_key_columns(manager, target_id, table).await?;
    let total_rows = get_row_count(manager, target_id, table).await?;
    let pages = total_pages(total_rows, page_size);
    validate_page(page, pages)?;

    let names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    let rows = fetch_page(manager, target_id, table, &names, page, page_size, sort).await?;
    debug!(target_id, table = %table.qualified(), page, pages, rows = rows.len(), "loaded page");

    let mut result = ResultSet::new(columns, rows)?.with_pagination(total_rows, page, page_size);
    result.set_primary_key(key);
    result.source = Some(table.clone());
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        boolean, connected_manager, count_result, int4, raw_result, text, text_column,
        MockConnector, TEST_TARGET,
    };
    use rstest::rstest;

    fn users() -> TableRef {
        TableRef::new("public", "users")
    }

    fn script_users_metadata(mock: &MockConnector, count: i64) {
        mock.push_rows(raw_result(
            &[
                ("name", "text"),
                ("type_name", "text"),
                ("nullable", "bool"),
                ("is_primary_key", "bool"),
            ],
            vec![
                vec![text("id"), text("int4"), boolean(false), boolean(true)],
                vec![text("name"), text("text"), boolean(true), boolean(false)],
            ],
        ));
        mock.push_rows(text_column("name", &["id"]));
        mock.push_rows(count_result(count));
    }

    #[rstest]
    #[case(0, 10)]
    #[case(1, 0)]
    #[tokio::test]
    async fn test_fetch_page_rejects_without_dispatch(#[case] page: u64, #[case] size: u64) {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;

        let err = fetch_page(&manager, TEST_TARGET, &users(), &[], page, size, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidArgument { .. }));
        assert!(mock.executed().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_page_sql() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(raw_result(&[("id", "int4")], vec![vec![int4(51)]]));

        let rows = fetch_page(
            &manager,
            TEST_TARGET,
            &users(),
            &[],
            2,
            50,
            Some(&SortSpec::descending("id")),
        )
        .await
        .unwrap();

        assert_eq!(rows, vec![vec![CellValue::Integer(51)]]);
        assert_eq!(
            mock.executed(),
            vec!["SELECT * FROM \"public\".\"users\" ORDER BY \"id\" DESC NULLS LAST LIMIT 50 OFFSET 50"]
        );
    }

    #[tokio::test]
    async fn test_load_table_page() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        script_users_metadata(&mock, 3);
        mock.push_rows(raw_result(
            &[("id", "int4"), ("name", "text")],
            vec![vec![int4(3), text("linus")]],
        ));

        let page = load_table_page(&manager, TEST_TARGET, &users(), 2, 2, None)
            .await
            .unwrap();

        assert_eq!(page.total_rows, 3);
        assert_eq!(page.total_pages(), 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.primary_key_columns, vec!["id"]);
        assert!(page.is_editable());
        assert_eq!(
            mock.executed()[3],
            "SELECT \"id\", \"name\" FROM \"public\".\"users\" LIMIT 2 OFFSET 2"
        );
    }

    #[rstest]
    #[case(0)]
    #[case(3)]
    #[tokio::test]
    async fn test_out_of_range_page_rejected_before_fetch(#[case] page: u64) {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        script_users_metadata(&mock, 10);

        let err = load_table_page(&manager, TEST_TARGET, &users(), page, 5, None)
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::InvalidPage { total_pages: 2, .. }));
        // columns, key and count only
        assert_eq!(mock.executed().len(), 3);
    }

    #[tokio::test]
    async fn test_empty_table_has_one_page() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        script_users_metadata(&mock, 0);

        let page = load_table_page(&manager, TEST_TARGET, &users(), 1, 50, None)
            .await
            .unwrap();

        assert_eq!(page.total_pages(), 1);
        assert!(page.rows.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_sort_column_rejected() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        script_users_metadata(&mock, 1);

        let err = load_table_page(
            &manager,
            TEST_TARGET,
            &users(),
            1,
            50,
            Some(&SortSpec::ascending("nope")),
        )
        .await
        .unwrap_err();

        assert!(err.to_string().contains("unknown column 'nope'"));
        assert_eq!(mock.executed().len(), 1);
    }
}
