//! PostgreSQL sessions over `tokio-postgres`.
//!
//! Statements are prepared before they run so column metadata is available
//! even when no rows come back, and rows are requested in the binary format.
//! Cells are pulled out as raw bytes and decoded by [`crate::decode`].

use std::error::Error;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio_postgres::types::{FromSql, Type};
use tokio_postgres::{Client, Config, NoTls};
use tracing::{debug, warn};

use super::{Connector, RawColumn, RawResult, Session};
use crate::error::{DbError, Result};
use crate::types::ConnectionTarget;

const APPLICATION_NAME: &str = "pgdesk";

/// A cell's wire bytes, accepted for every column type.
struct RawCell(Vec<u8>);

impl<'a> FromSql<'a> for RawCell {
    fn from_sql(_ty: &Type, raw: &'a [u8]) -> std::result::Result<Self, Box<dyn Error + Sync + Send>> {
        Ok(RawCell(raw.to_vec()))
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

/// Dials plain-TCP (or Unix socket) sessions.
#[derive(Debug, Default, Clone)]
pub struct PgConnector;

impl PgConnector {
    pub fn new() -> Self {
        Self
    }

    fn config_for(target: &ConnectionTarget) -> Config {
        let mut config = Config::new();
        config
            .host(&target.host)
            .port(target.port)
            .dbname(&target.database)
            .user(&target.username)
            .application_name(APPLICATION_NAME);
        if !target.password.is_empty() {
            config.password(&target.password);
        }
        config
    }
}

#[async_trait]
impl Connector for PgConnector {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Arc<dyn Session>> {
        debug!(target_id = %target.id, host = %target.host, port = target.port, "dialing postgres");

        let (client, connection) = Self::config_for(target)
            .connect(NoTls)
            .await
            .map_err(|e| DbError::ConnectFailed {
                target: target.id.clone(),
                message: e.to_string(),
            })?;

        let target_id = target.id.clone();
        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(target_id = %target_id, error = %e, "postgres connection ended with error");
            }
        });

        Ok(Arc::new(PgSession { client, driver }))
    }
}

/// A live client plus the task driving its socket.
pub struct PgSession {
    client: Client,
    driver: JoinHandle<()>,
}

#[async_trait]
impl Session for PgSession {
    async fn query(&self, sql: &str) -> Result<RawResult> {
        let statement = self.client.prepare(sql).await?;
        let columns = statement
            .columns()
            .iter()
            .map(|c| RawColumn::new(c.name(), c.type_().name()))
            .collect::<Vec<_>>();

        let rows = self.client.query(&statement, &[]).await?;
        let mut raw_rows = Vec::with_capacity(rows.len());
        for row in rows {
            let mut cells = Vec::with_capacity(columns.len());
            for index in 0..columns.len() {
                let cell: Option<RawCell> = row.try_get(index)?;
                cells.push(cell.map(|c| c.0));
            }
            raw_rows.push(cells);
        }

        Ok(RawResult::new(columns, raw_rows))
    }

    async fn execute(&self, sql: &str) -> Result<u64> {
        Ok(self.client.execute(sql, &[]).await?)
    }

    async fn ping(&self) -> Result<()> {
        self.client.simple_query("SELECT 1").await?;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.client.is_closed() || self.driver.is_finished()
    }

    async fn close(&self) {
        self.driver.abort();
    }
}

impl Drop for PgSession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn test_raw_cell_accepts_any_type() {
        assert!(<RawCell as FromSql>::accepts(&Type::INT8));
        assert!(<RawCell as FromSql>::accepts(&Type::JSONB));
        assert!(<RawCell as FromSql>::accepts(&Type::TEXT_ARRAY));
    }

    #[rstest]
    fn test_raw_cell_keeps_bytes() {
        let cell = RawCell::from_sql(&Type::INT4, &[0, 0, 0, 9]).unwrap();
        assert_eq!(cell.0, vec![0, 0, 0, 9]);
    }

    #[rstest]
    fn test_config_for_target() {
        let target = ConnectionTarget::new("t", "db.local", 6000, "shop", "alice", "pw");
        let config = PgConnector::config_for(&target);
        assert_eq!(config.get_ports(), &[6000]);
        assert_eq!(config.get_dbname(), Some("shop"));
        assert_eq!(config.get_user(), Some("alice"));
        assert_eq!(config.get_password(), Some(&b"pw"[..]));
        assert_eq!(config.get_application_name(), Some(APPLICATION_NAME));
    }

    #[rstest]
    fn test_config_omits_empty_password() {
        let target = ConnectionTarget::new("t", "localhost", 5432, "d", "u", "");
        assert_eq!(PgConnector::config_for(&target).get_password(), None);
    }
}
