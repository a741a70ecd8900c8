//! Builder for paginated table reads.

use crate::escape::quote_ident;
use crate::types::{page_offset, SortSpec, TableRef};

/// Builds `SELECT <cols|*> FROM "s"."t" [ORDER BY ...] LIMIT n OFFSET m`.
///
/// # Examples
///
/// ```ignore
/// let sql = PageQueryBuilder::new(&TableRef::new("public", "users"))
///     .with_sort(Some(&SortSpec::descending("created_at")))
///     .paginate(2, 50)
///     .build();
/// // SELECT * FROM "public"."users" ORDER BY "created_at" DESC NULLS LAST LIMIT 50 OFFSET 50
/// ```
pub struct PageQueryBuilder {
    table: TableRef,
    columns: Vec<String>,
    sort: Option<SortSpec>,
    page: u64,
    page_size: u64,
}

impl PageQueryBuilder {
    pub fn new(table: &TableRef) -> Self {
        Self {
            table: table.clone(),
            columns: Vec::new(),
            sort: None,
            page: 1,
            page_size: 1,
        }
    }

    /// Project these columns instead of `*`.
    pub fn with_columns(mut self, columns: &[String]) -> Self {
        self.columns = columns.to_vec();
        self
    }

    pub fn with_sort(mut self, sort: Option<&SortSpec>) -> Self {
        self.sort = sort.cloned();
        self
    }

    /// 1-based page of `page_size` rows. Callers validate both beforehand.
    pub fn paginate(mut self, page: u64, page_size: u64) -> Self {
        self.page = page;
        self.page_size = page_size;
        self
    }

    pub fn build(&self) -> String {
        let projection = if self.columns.is_empty() {
            "*".to_string()
        } else {
            self.columns
                .iter()
                .map(|c| quote_ident(c))
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut sql = format!("SELECT {} FROM {}", projection, self.table.qualified());
        if let Some(sort) = &self.sort {
            sql.push_str(&format!(
                " ORDER BY {} {} NULLS LAST",
                quote_ident(&sort.column),
                if sort.ascending { "ASC" } else { "DESC" }
            ));
        }
        sql.push_str(&format!(
            " LIMIT {} OFFSET {}",
            self.page_size,
            page_offset(self.page, self.page_size)
        ));
        sql
    }
}
