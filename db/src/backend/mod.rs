//! Backend abstraction layer for database sessions.
//!
//! This module provides the trait definitions the connection manager drives,
//! so the resilience logic can run against the real PostgreSQL driver or a
//! scripted stand-in in tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::decode::decode;
use crate::error::Result;
use crate::types::{ColumnDescriptor, ConnectionTarget};
use crate::value::CellValue;

pub mod postgres;

/// Column metadata as reported by the wire protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawColumn {
    /// Column label; empty when the server reports none.
    pub name: String,
    /// Declared type name, e.g. `int8` or `timestamptz`.
    pub type_name: String,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
        }
    }
}

/// Undecoded query output: column metadata plus the raw bytes of every cell.
///
/// A `None` cell is SQL NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResult {
    pub columns: Vec<RawColumn>,
    pub rows: Vec<Vec<Option<Vec<u8>>>>,
}

impl RawResult {
    pub fn new(columns: Vec<RawColumn>, rows: Vec<Vec<Option<Vec<u8>>>>) -> Self {
        Self { columns, rows }
    }

    /// Decode every cell by its column's declared type.
    ///
    /// Columns the server left unnamed get `column_1`, `column_2`, ...
    /// by position.
    pub fn decode(self) -> (Vec<ColumnDescriptor>, Vec<Vec<CellValue>>) {
        let columns: Vec<ColumnDescriptor> = self
            .columns
            .iter()
            .enumerate()
            .map(|(ordinal, column)| {
                let name = if column.name.is_empty() || column.name == "?column?" {
                    format!("column_{}", ordinal + 1)
                } else {
                    column.name.clone()
                };
                ColumnDescriptor::new(name, column.type_name.clone(), ordinal)
            })
            .collect();

        let rows = self
            .rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .enumerate()
                    .map(|(i, column)| {
                        let raw = row.get(i).and_then(|cell| cell.as_deref());
                        decode(raw, &column.type_name)
                    })
                    .collect()
            })
            .collect();

        (columns, rows)
    }
}

/// One live protocol session.
///
/// Implementations must be thread-safe; the manager hands out shared
/// references and serializes use per target itself.
#[async_trait]
pub trait Session: Send + Sync {
    /// Runs a statement that returns rows.
    async fn query(&self, sql: &str) -> Result<RawResult>;

    /// Runs a statement and returns the affected-row count.
    async fn execute(&self, sql: &str) -> Result<u64>;

    /// Trivial round trip.
    async fn ping(&self) -> Result<()>;

    /// Whether the transport is known to be gone. Never touches the network.
    fn is_closed(&self) -> bool;

    /// Tears the session down. Idempotent.
    async fn close(&self);
}

/// Dials new sessions.
#[async_trait]
pub trait Connector: Send + Sync {
    async fn connect(&self, target: &ConnectionTarget) -> Result<Arc<dyn Session>>;
}
