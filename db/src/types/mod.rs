//! Shared types for targets, catalog metadata and result sets.

mod results;
mod schema;
mod target;

pub use results::{page_offset, total_pages, validate_page, ResultSet};
pub use schema::{ColumnDescriptor, SortSpec, TableDescriptor, TableKind, TableRef};
pub use target::{ConnectionTarget, DEFAULT_PORT};
