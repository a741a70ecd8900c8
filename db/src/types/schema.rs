use serde::Serialize;

use crate::escape::qualify;

/// A schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableRef {
    pub schema: String,
    pub table: String,
}

impl TableRef {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// `"schema"."table"`
    pub fn qualified(&self) -> String {
        qualify(&[&self.schema, &self.table])
    }
}

/// Relation kinds listed by the table browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Table,
    View,
    MaterializedView,
    Foreign,
    Partitioned,
}

impl TableKind {
    /// Map a `pg_class.relkind` code.
    pub fn from_relkind(code: &str) -> Option<Self> {
        match code {
            "r" => Some(TableKind::Table),
            "v" => Some(TableKind::View),
            "m" => Some(TableKind::MaterializedView),
            "f" => Some(TableKind::Foreign),
            "p" => Some(TableKind::Partitioned),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TableKind::Table => "table",
            TableKind::View => "view",
            TableKind::MaterializedView => "materialized view",
            TableKind::Foreign => "foreign table",
            TableKind::Partitioned => "partitioned table",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableDescriptor {
    pub schema: String,
    pub name: String,
    pub kind: TableKind,
}

/// Metadata for one result or table column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub type_name: String,
    pub nullable: bool,
    pub is_primary_key: bool,
    pub ordinal: usize,
    /// Injected only to support edit tracking; never rendered.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub hidden: bool,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>, ordinal: usize) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            nullable: true,
            is_primary_key: false,
            ordinal,
            hidden: false,
        }
    }
}

/// Sort order for paginated table reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortSpec {
    pub column: String,
    pub ascending: bool,
}

impl SortSpec {
    pub fn ascending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn descending(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}
