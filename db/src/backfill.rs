//! Primary-key back-fill for editable ad-hoc queries.
//!
//! Edits are scoped by primary key, so when an editable query leaves a key
//! column out of its select list the query is rewritten to select it first.
//! The service then hides those leading columns from the caller.

use std::sync::LazyLock;

use regex::Regex;

use crate::analyzer::{is_top_level, normalize_identifier};
use crate::escape::{qualify, quote_ident};
use crate::types::TableRef;

static SELECT_HEAD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*select(?:\s+distinct(?:\s+on\s*\([^)]*\))?)?\s+").unwrap()
});

static FROM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").unwrap());

static EXPLICIT_ALIAS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)\s+as\s+(?P<alias>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)$"#).unwrap()
});

static IMPLICIT_ALIAS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)^.*[\w")\]]\s+(?P<alias>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)$"#).unwrap()
});

static COLUMN_REF_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:(?:"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)\s*\.\s*)*(?P<name>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)$"#,
    )
    .unwrap()
});

/// Trailing words that close an expression rather than name it.
const NOT_ALIASES: &[&str] = &["end", "null", "true", "false", "asc", "desc"];

/// A rewritten query and the key columns it now selects up front.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backfill {
    pub sql: String,
    pub injected: Vec<String>,
}

/// One select-list entry: the name it is output under and, for a plain
/// column reference, the column it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectItem {
    pub name: String,
    pub column: Option<String>,
}

impl SelectItem {
    fn reads(&self, column: &str) -> bool {
        self.name == column && self.column.as_deref() == Some(column)
    }
}

/// Entries of the select list, or `None` when it contains a `*` / `t.*`
/// projection (every column is already selected).
pub fn select_items(sql: &str) -> Option<Vec<SelectItem>> {
    let head = SELECT_HEAD_REGEX.find(sql)?;
    let body = &sql[head.end()..];
    let list_end = FROM_REGEX
        .find_iter(body)
        .find(|m| is_top_level(&body[..m.start()]))
        .map_or(body.len(), |m| m.start());

    let mut items = Vec::new();
    for item in split_top_level(&body[..list_end]) {
        let item = item.trim();
        if item == "*" || item.ends_with(".*") {
            return None;
        }
        items.push(parse_item(item));
    }
    Some(items)
}

/// Output column names of the select list, or `None` for a star projection.
///
/// Expressions without an alias that are not plain column references come
/// back as `?column?`.
pub fn selected_output_names(sql: &str) -> Option<Vec<String>> {
    select_items(sql).map(|items| items.into_iter().map(|item| item.name).collect())
}

/// Key columns that the query does not select directly, in key order.
///
/// A key column only counts as selected when an entry reads that column
/// under its own name.
pub fn missing_primary_keys(sql: &str, primary_key: &[String]) -> Vec<String> {
    let Some(items) = select_items(sql) else {
        return Vec::new();
    };
    primary_key
        .iter()
        .filter(|pk| !items.iter().any(|item| item.reads(pk)))
        .cloned()
        .collect()
}

/// Key column names that the select list uses for some other value, as in
/// `SELECT name AS id`. Rows of such a result cannot be told apart by key.
pub fn shadowed_primary_keys(sql: &str, primary_key: &[String]) -> Vec<String> {
    let Some(items) = select_items(sql) else {
        return Vec::new();
    };
    primary_key
        .iter()
        .filter(|pk| items.iter().any(|item| item.name == **pk && !item.reads(pk)))
        .cloned()
        .collect()
}

/// Insert `qualifier."col", ...` right after `SELECT` / `SELECT DISTINCT`.
pub fn inject_columns(sql: &str, qualifier: &str, columns: &[String]) -> Option<String> {
    if columns.is_empty() {
        return Some(sql.to_string());
    }
    let head = SELECT_HEAD_REGEX.find(sql)?;
    let injected = columns
        .iter()
        .map(|c| format!("{}.{}", qualifier, quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    Some(format!(
        "{}{}, {}",
        &sql[..head.end()],
        injected,
        &sql[head.end()..]
    ))
}

/// How injected columns are qualified: by the FROM alias when there is one,
/// otherwise `"schema"."table"`.
pub fn qualifier_for(table: &TableRef, alias: Option<&str>) -> String {
    match alias {
        Some(alias) => quote_ident(alias),
        None => qualify(&[&table.schema, &table.table]),
    }
}

/// Rewrite `sql` to select any missing key columns. `None` when nothing is
/// missing or the statement head is not recognised.
pub fn plan(
    sql: &str,
    table: &TableRef,
    alias: Option<&str>,
    primary_key: &[String],
) -> Option<Backfill> {
    let missing = missing_primary_keys(sql, primary_key);
    if missing.is_empty() {
        return None;
    }
    let rewritten = inject_columns(sql, &qualifier_for(table, alias), &missing)?;
    Some(Backfill {
        sql: rewritten,
        injected: missing,
    })
}

fn parse_item(item: &str) -> SelectItem {
    if let Some(caps) = EXPLICIT_ALIAS_REGEX.captures(item) {
        let start = caps.get(0).map_or(item.len(), |m| m.start());
        return SelectItem {
            name: normalize_identifier(&caps["alias"]),
            column: column_reference(&item[..start]),
        };
    }
    if let Some(column) = column_reference(item) {
        return SelectItem {
            name: column.clone(),
            column: Some(column),
        };
    }
    if let Some(caps) = IMPLICIT_ALIAS_REGEX.captures(item) {
        let alias = caps.name("alias").map_or("", |m| m.as_str());
        if !NOT_ALIASES.contains(&alias.to_lowercase().as_str()) {
            let start = caps.name("alias").map_or(item.len(), |m| m.start());
            return SelectItem {
                name: normalize_identifier(alias),
                column: column_reference(&item[..start]),
            };
        }
    }
    SelectItem {
        name: "?column?".to_string(),
        column: None,
    }
}

/// The column read by a plain (optionally qualified) column reference.
fn column_reference(expr: &str) -> Option<String> {
    COLUMN_REF_REGEX
        .captures(expr.trim())
        .map(|caps| normalize_identifier(&caps["name"]))
}

/// Split on commas outside parentheses and quotes.
fn split_top_level(list: &str) -> Vec<&str> {
    let mut items = Vec::new();
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, ch) in list.char_indices() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, ',') if depth == 0 => {
                items.push(&list[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
}
