//! Core of a PostgreSQL desktop client: resilient connections, typed result
//! decoding, query editability, and cell-level change tracking.

pub mod analyzer;
pub mod backend;
pub mod backfill;
pub mod config;
pub mod decode;
pub mod error;
pub mod escape;
pub mod manager;
pub mod queries;
pub mod query_builders;
pub mod service;
pub mod session;
pub mod tracker;
pub mod types;
pub mod value;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items
pub use analyzer::{analyze, QueryClassification};
pub use backend::{Connector, RawColumn, RawResult, Session};
pub use config::Timeouts;
pub use error::{DbError, Result, TimeoutKind};
pub use manager::ConnectionManager;
pub use service::DatabaseService;
pub use session::EditSession;
pub use tracker::{ChangeTracker, EditOutcome, PendingEdit};
pub use types::{
    ColumnDescriptor, ConnectionTarget, ResultSet, SortSpec, TableDescriptor, TableKind, TableRef,
};
pub use value::CellValue;
