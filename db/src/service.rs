//! The request/response surface a client front end talks to.
//!
//! Every read and write goes through the connection manager's
//! reconnect-once wrapper; this type only names the operations.

use crate::analyzer::{analyze, QueryClassification};
use crate::config::Timeouts;
use crate::error::Result;
use crate::manager::ConnectionManager;
use crate::queries::{catalog, custom, page};
use crate::types::{ColumnDescriptor, ConnectionTarget, ResultSet, SortSpec, TableDescriptor, TableRef};
use crate::value::CellValue;

pub struct DatabaseService {
    manager: ConnectionManager,
}

impl DatabaseService {
    pub fn new(manager: ConnectionManager) -> Self {
        Self { manager }
    }

    /// A service dialing real PostgreSQL servers.
    pub fn postgres(timeouts: Timeouts) -> Self {
        Self::new(ConnectionManager::postgres(timeouts))
    }

    pub fn manager(&self) -> &ConnectionManager {
        &self.manager
    }

    pub async fn connect(&self, target: &ConnectionTarget) -> Result<()> {
        self.manager.connect(target).await
    }

    pub async fn disconnect(&self, target_id: &str) {
        self.manager.disconnect(target_id).await
    }

    pub async fn is_connected(&self, target_id: &str) -> bool {
        self.manager.is_connected(target_id).await
    }

    pub async fn is_connection_healthy(&self, target_id: &str) -> bool {
        self.manager.is_connection_healthy(target_id).await
    }

    pub async fn list_schemas(&self, target_id: &str) -> Result<Vec<String>> {
        catalog::list_schemas(&self.manager, target_id).await
    }

    pub async fn list_tables(&self, target_id: &str, schema: &str) -> Result<Vec<TableDescriptor>> {
        catalog::list_tables(&self.manager, target_id, schema).await
    }

    pub async fn get_columns(
        &self,
        target_id: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<ColumnDescriptor>> {
        catalog::get_columns(&self.manager, target_id, &TableRef::new(schema, table)).await
    }

    pub async fn primary_key_columns(
        &self,
        target_id: &str,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>> {
        catalog::primary_key_columns(&self.manager, target_id, &TableRef::new(schema, table)).await
    }

    pub async fn get_row_count(&self, target_id: &str, schema: &str, table: &str) -> Result<u64> {
        catalog::get_row_count(&self.manager, target_id, &TableRef::new(schema, table)).await
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn fetch_page(
        &self,
        target_id: &str,
        schema: &str,
        table: &str,
        columns: &[String],
        page: u64,
        page_size: u64,
        sort: Option<&SortSpec>,
    ) -> Result<Vec<Vec<CellValue>>> {
        page::fetch_page(
            &self.manager,
            target_id,
            &TableRef::new(schema, table),
            columns,
            page,
            page_size,
            sort,
        )
        .await
    }

    pub async fn load_table_page(
        &self,
        target_id: &str,
        schema: &str,
        table: &str,
        page: u64,
        page_size: u64,
        sort: Option<&SortSpec>,
    ) -> Result<ResultSet> {
        page::load_table_page(
            &self.manager,
            target_id,
            &TableRef::new(schema, table),
            page,
            page_size,
            sort,
        )
        .await
    }

    pub async fn execute_query(&self, target_id: &str, sql: &str) -> Result<ResultSet> {
        custom::execute_query(&self.manager, target_id, sql).await
    }

    pub async fn execute_statement(&self, target_id: &str, sql: &str) -> Result<u64> {
        custom::execute_statement(&self.manager, target_id, sql).await
    }

    /// Editability verdict without touching the server.
    pub fn analyze(&self, sql: &str) -> QueryClassification {
        analyze(sql)
    }
}
