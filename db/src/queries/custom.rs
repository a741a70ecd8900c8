//! Ad-hoc SQL from the query editor.

use tracing::debug;

use crate::analyzer::{analyze, QueryClassification};
use crate::backfill;
use crate::error::Result;
use crate::manager::ConnectionManager;
use crate::queries::catalog::primary_key_columns;
use crate::queries::{run_query, run_statement};
use crate::types::ResultSet;

async fn plain_result(manager: &ConnectionManager, target_id: &str, sql: &str) -> Result<ResultSet> {
    let (columns, rows) = run_query(manager, target_id, sql.to_string())
        .await?
        .decode();
    ResultSet::new(columns, rows)
}

/// Run a read statement.
///
/// When the statement is editable and the table has a primary key, any key
/// columns the select list leaves out are selected up front and marked
/// hidden, and the result carries its source table and key.
pub async fn execute_query(
    manager: &ConnectionManager,
    target_id: &str,
    sql: &str,
) -> Result<ResultSet> {
    let (table, alias) = match analyze(sql) {
        QueryClassification::Editable { table, alias } => (table, alias),
        QueryClassification::ReadOnly { reason } => {
            debug!(target_id, reason = %reason, "read-only query");
            return plain_result(manager, target_id, sql).await;
        }
    };

    let key = primary_key_columns(manager, target_id, &table).await?;
    if key.is_empty() {
        debug!(target_id, table = %table.qualified(), "no primary key, read-only");
        return plain_result(manager, target_id, sql).await;
    }

    let shadowed = backfill::shadowed_primary_keys(sql, &key);
    if !shadowed.is_empty() {
        debug!(target_id, columns = ?shadowed, "key column names reused, read-only");
        return plain_result(manager, target_id, sql).await;
    }

    let (sql, injected) = match backfill::plan(sql, &table, alias.as_deref(), &key) {
        Some(plan) => {
            debug!(target_id, columns = ?plan.injected, "back-filling key columns");
            (plan.sql, plan.injected.len())
        }
        None => (sql.to_string(), 0),
    };

    let (columns, rows) = run_query(manager, target_id, sql).await?.decode();
    let mut result = ResultSet::new(columns, rows)?;
    result.hide_leading_columns(injected);
    result.set_primary_key(key);
    result.source = Some(table);
    Ok(result)
}

/// Run a write statement and return the affected-row count.
pub async fn execute_statement(
    manager: &ConnectionManager,
    target_id: &str,
    sql: &str,
) -> Result<u64> {
    run_statement(manager, target_id, sql.to_string()).await
}
