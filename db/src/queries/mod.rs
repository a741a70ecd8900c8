//! Database operations for the browser and query editor.
//!
//! Each module builds SQL for one family of operations, runs it through
//! [`ConnectionManager::execute_with_reconnect`], and turns the decoded rows
//! into typed results.
//!
//! # Query Categories
//!
//! ## Catalog
//! - [`catalog`] - Schemas, tables, columns, primary keys and row counts
//!
//! ## Table Browsing
//! - [`page`] - Paginated, optionally sorted reads of one table
//!
//! ## Ad-hoc SQL
//! - [`custom`] - Arbitrary queries (with primary-key back-fill) and statements
//!
//! Identifiers are quoted with [`crate::escape::quote_ident`] and values with
//! [`crate::escape::quote_literal`] to prevent injection.

use tracing::debug;

use crate::backend::RawResult;
use crate::error::Result;
use crate::manager::ConnectionManager;

pub mod catalog;
pub mod custom;
pub mod page;

/// Run a row-returning statement with reconnect-once semantics.
pub(crate) async fn run_query(
    manager: &ConnectionManager,
    target_id: &str,
    sql: String,
) -> Result<RawResult> {
    debug!(target_id, sql = %sql, "query");
    manager
        .execute_with_reconnect(target_id, |session| {
            let sql = sql.clone();
            async move { session.query(&sql).await }
        })
        .await
}

/// Run a statement and return its affected-row count.
pub(crate) async fn run_statement(
    manager: &ConnectionManager,
    target_id: &str,
    sql: String,
) -> Result<u64> {
    debug!(target_id, sql = %sql, "statement");
    manager
        .execute_with_reconnect(target_id, |session| {
            let sql = sql.clone();
            async move { session.execute(&sql).await }
        })
        .await
}
