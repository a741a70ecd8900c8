//! Catalog lookups: schemas, tables, columns, keys and counts.

use crate::error::{DbError, Result};
use crate::escape::quote_literal;
use crate::manager::ConnectionManager;
use crate::queries::run_query;
use crate::types::{ColumnDescriptor, TableDescriptor, TableKind, TableRef};
use crate::value::CellValue;

/// Schemas visible to the user. System and per-session temp/toast schemas
/// are excluded.
pub const SCHEMAS_SQL: &str = "SELECT nspname::text AS schema_name \
     FROM pg_catalog.pg_namespace \
     WHERE nspname NOT IN ('pg_catalog', 'information_schema') \
     AND nspname NOT LIKE 'pg\\_toast%' \
     AND nspname NOT LIKE 'pg\\_temp%' \
     ORDER BY nspname";

pub fn tables_sql(schema: &str) -> String {
    format!(
        "SELECT c.relname::text AS name, c.relkind::text AS kind \
         FROM pg_catalog.pg_class c \
         JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         WHERE n.nspname = {} AND c.relkind IN ('r', 'v', 'm', 'f', 'p') \
         ORDER BY c.relname",
        quote_literal(schema)
    )
}

pub fn columns_sql(table: &TableRef) -> String {
    format!(
        "SELECT a.attname::text AS name, t.typname::text AS type_name, \
         NOT a.attnotnull AS nullable, \
         COALESCE(a.attnum = ANY (i.indkey), false) AS is_primary_key \
         FROM pg_catalog.pg_attribute a \
         JOIN pg_catalog.pg_class c ON c.oid = a.attrelid \
         JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         JOIN pg_catalog.pg_type t ON t.oid = a.atttypid \
         LEFT JOIN pg_catalog.pg_index i ON i.indrelid = c.oid AND i.indisprimary \
         WHERE n.nspname = {} AND c.relname = {} AND a.attnum > 0 AND NOT a.attisdropped \
         ORDER BY a.attnum",
        quote_literal(&table.schema),
        quote_literal(&table.table)
    )
}

pub fn primary_key_sql(table: &TableRef) -> String {
    format!(
        "SELECT a.attname::text AS name \
         FROM pg_catalog.pg_index i \
         JOIN pg_catalog.pg_class c ON c.oid = i.indrelid \
         JOIN pg_catalog.pg_namespace n ON n.oid = c.relnamespace \
         CROSS JOIN LATERAL unnest(i.indkey) WITH ORDINALITY AS k(attnum, position) \
         JOIN pg_catalog.pg_attribute a ON a.attrelid = c.oid AND a.attnum = k.attnum \
         WHERE i.indisprimary AND n.nspname = {} AND c.relname = {} \
         ORDER BY k.position",
        quote_literal(&table.schema),
        quote_literal(&table.table)
    )
}

pub fn row_count_sql(table: &TableRef) -> String {
    format!("SELECT COUNT(*) FROM {}", table.qualified())
}

fn cell_text(row: &[CellValue], index: usize) -> String {
    match row.get(index) {
        Some(CellValue::Null) | None => String::new(),
        Some(value) => value.to_string(),
    }
}

fn first_column(rows: &[Vec<CellValue>]) -> Vec<String> {
    rows.iter().map(|row| cell_text(row, 0)).collect()
}

pub async fn list_schemas(manager: &ConnectionManager, target_id: &str) -> Result<Vec<String>> {
    let (_, rows) = run_query(manager, target_id, SCHEMAS_SQL.to_string())
        .await?
        .decode();
    Ok(first_column(&rows))
}

pub async fn list_tables(
    manager: &ConnectionManager,
    target_id: &str,
    schema: &str,
) -> Result<Vec<TableDescriptor>> {
    let (_, rows) = run_query(manager, target_id, tables_sql(schema))
        .await?
        .decode();

    Ok(rows
        .iter()
        .filter_map(|row| {
            let kind = TableKind::from_relkind(&cell_text(row, 1))?;
            Some(TableDescriptor {
                schema: schema.to_string(),
                name: cell_text(row, 0),
                kind,
            })
        })
        .collect())
}

/// Columns in ordinal order, with nullability and key membership.
pub async fn get_columns(
    manager: &ConnectionManager,
    target_id: &str,
    table: &TableRef,
) -> Result<Vec<ColumnDescriptor>> {
    let (_, rows) = run_query(manager, target_id, columns_sql(table))
        .await?
        .decode();

    Ok(rows
        .iter()
        .enumerate()
        .map(|(ordinal, row)| ColumnDescriptor {
            name: cell_text(row, 0),
            type_name: cell_text(row, 1),
            nullable: row.get(2).and_then(CellValue::as_bool).unwrap_or(true),
            is_primary_key: row.get(3).and_then(CellValue::as_bool).unwrap_or(false),
            ordinal,
            hidden: false,
        })
        .collect())
}

/// Primary-key column names in key order. Empty when the table has none.
pub async fn primary_key_columns(
    manager: &ConnectionManager,
    target_id: &str,
    table: &TableRef,
) -> Result<Vec<String>> {
    let (_, rows) = run_query(manager, target_id, primary_key_sql(table))
        .await?
        .decode();
    Ok(first_column(&rows))
}

pub async fn get_row_count(
    manager: &ConnectionManager,
    target_id: &str,
    table: &TableRef,
) -> Result<u64> {
    let (_, rows) = run_query(manager, target_id, row_count_sql(table))
        .await?
        .decode();

    let count = rows
        .first()
        .and_then(|row| row.first())
        .and_then(CellValue::as_i64)
        .ok_or_else(|| DbError::query_failed("row count query returned no value"))?;
    Ok(u64::try_from(count).unwrap_or(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        boolean, connected_manager, count_result, raw_result, text, text_column, MockConnector,
        TEST_TARGET,
    };
    use rstest::rstest;

    #[rstest]
    fn test_literals_are_escaped() {
        let sql = columns_sql(&TableRef::new("o'neil", "t"));
        assert!(sql.contains("n.nspname = 'o''neil'"));
        assert_eq!(
            row_count_sql(&TableRef::new("public", "we\"ird")),
            "SELECT COUNT(*) FROM \"public\".\"we\"\"ird\""
        );
    }

    #[tokio::test]
    async fn test_list_schemas() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(text_column("schema_name", &["public", "sales"]));

        let schemas = list_schemas(&manager, TEST_TARGET).await.unwrap();

        assert_eq!(schemas, vec!["public", "sales"]);
        assert!(mock.executed()[0].contains("pg\\_toast%"));
    }

    #[tokio::test]
    async fn test_list_tables_maps_relkind() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(raw_result(
            &[("name", "text"), ("kind", "text")],
            vec![
                vec![text("orders"), text("r")],
                vec![text("order_totals"), text("m")],
                vec![text("recent"), text("v")],
                vec![text("odd"), text("S")],
            ],
        ));

        let tables = list_tables(&manager, TEST_TARGET, "sales").await.unwrap();

        let kinds: Vec<_> = tables.iter().map(|t| (t.name.as_str(), t.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                ("orders", TableKind::Table),
                ("order_totals", TableKind::MaterializedView),
                ("recent", TableKind::View),
            ]
        );
        assert!(tables.iter().all(|t| t.schema == "sales"));
    }

    #[tokio::test]
    async fn test_get_columns() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(raw_result(
            &[
                ("name", "text"),
                ("type_name", "text"),
                ("nullable", "bool"),
                ("is_primary_key", "bool"),
            ],
            vec![
                vec![text("id"), text("int4"), boolean(false), boolean(true)],
                vec![text("email"), text("varchar"), boolean(true), boolean(false)],
            ],
        ));

        let columns = get_columns(&manager, TEST_TARGET, &TableRef::new("public", "users"))
            .await
            .unwrap();

        assert_eq!(columns.len(), 2);
        assert!(columns[0].is_primary_key && !columns[0].nullable);
        assert_eq!(columns[1].name, "email");
        assert_eq!(columns[1].type_name, "varchar");
        assert_eq!(columns[1].ordinal, 1);
    }

    #[tokio::test]
    async fn test_primary_key_columns_in_key_order() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(text_column("name", &["tenant_id", "id"]));

        let pk = primary_key_columns(&manager, TEST_TARGET, &TableRef::new("public", "t"))
            .await
            .unwrap();
        assert_eq!(pk, vec!["tenant_id", "id"]);
    }

    #[tokio::test]
    async fn test_row_count() {
        let mock = MockConnector::new();
        let manager = connected_manager(&mock).await;
        mock.push_rows(count_result(1234));

        let count = get_row_count(&manager, TEST_TARGET, &TableRef::new("public", "t"))
            .await
            .unwrap();
        assert_eq!(count, 1234);
        assert_eq!(mock.executed()[0], "SELECT COUNT(*) FROM \"public\".\"t\"");
    }
}
