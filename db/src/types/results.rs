//! Result sets and pagination arithmetic.

use serde::Serialize;

use super::{ColumnDescriptor, TableRef};
use crate::error::{DbError, Result};
use crate::value::CellValue;

/// `max(1, ceil(total_rows / page_size))`. A zero page size is treated as one
/// page so the result is always a valid upper bound.
pub fn total_pages(total_rows: u64, page_size: u64) -> u64 {
    if page_size == 0 {
        return 1;
    }
    total_rows.div_ceil(page_size).max(1)
}

/// Reject pages outside `[1, total_pages]`.
pub fn validate_page(page: u64, total_pages: u64) -> Result<()> {
    if page < 1 || page > total_pages {
        return Err(DbError::InvalidPage { page, total_pages });
    }
    Ok(())
}

/// Row offset of the first row on a 1-based page.
pub fn page_offset(page: u64, page_size: u64) -> u64 {
    page.saturating_sub(1).saturating_mul(page_size)
}

/// One executed read: columns, aligned rows, and pagination metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<ColumnDescriptor>,
    pub rows: Vec<Vec<CellValue>>,
    pub primary_key_columns: Vec<String>,
    pub total_rows: u64,
    pub page: u64,
    pub page_size: u64,
    /// The table rows can be written back to; `None` for read-only results.
    pub source: Option<TableRef>,
}

impl ResultSet {
    /// Build a single-page result. Every row must have one cell per column.
    pub fn new(columns: Vec<ColumnDescriptor>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        if let Some((index, row)) = rows
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != columns.len())
        {
            return Err(DbError::invalid_argument(format!(
                "row {} has {} cells but the result has {} columns",
                index,
                row.len(),
                columns.len()
            )));
        }

        let total_rows = rows.len() as u64;
        Ok(Self {
            columns,
            rows,
            primary_key_columns: Vec::new(),
            total_rows,
            page: 1,
            page_size: total_rows.max(1),
            source: None,
        })
    }

    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
            primary_key_columns: Vec::new(),
            total_rows: 0,
            page: 1,
            page_size: 1,
            source: None,
        }
    }

    pub fn with_pagination(mut self, total_rows: u64, page: u64, page_size: u64) -> Self {
        self.total_rows = total_rows;
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn total_pages(&self) -> u64 {
        total_pages(self.total_rows, self.page_size)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&CellValue> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn visible_columns(&self) -> Vec<&ColumnDescriptor> {
        self.columns.iter().filter(|c| !c.hidden).collect()
    }

    pub fn visible_row(&self, row: usize) -> Option<Vec<&CellValue>> {
        let cells = self.rows.get(row)?;
        Some(
            self.columns
                .iter()
                .zip(cells)
                .filter(|(column, _)| !column.hidden)
                .map(|(_, cell)| cell)
                .collect(),
        )
    }

    /// Mark the first `count` columns as hidden.
    pub fn hide_leading_columns(&mut self, count: usize) {
        for column in self.columns.iter_mut().take(count) {
            column.hidden = true;
        }
    }

    /// Record the key columns and flag them on the descriptors.
    pub fn set_primary_key(&mut self, key_columns: Vec<String>) {
        for column in &mut self.columns {
            column.is_primary_key = key_columns.contains(&column.name);
        }
        self.primary_key_columns = key_columns;
    }

    /// The row's key values in key order, or empty when any key column is
    /// missing from the result.
    pub fn primary_key_snapshot(&self, row: usize) -> Vec<(String, CellValue)> {
        let Some(cells) = self.rows.get(row) else {
            return Vec::new();
        };

        let mut snapshot = Vec::with_capacity(self.primary_key_columns.len());
        for name in &self.primary_key_columns {
            match self.column_index(name) {
                Some(index) => snapshot.push((name.clone(), cells[index].clone())),
                None => return Vec::new(),
            }
        }
        snapshot
    }

    /// Whether edits can be scoped back to a single source table row.
    pub fn is_editable(&self) -> bool {
        self.source.is_some()
            && !self.primary_key_columns.is_empty()
            && self
                .primary_key_columns
                .iter()
                .all(|name| self.column_index(name).is_some())
    }
}
