//! Decides whether the rows of an ad-hoc query can be edited in place.
//!
//! This is a conservative text heuristic, not a SQL parser: it rejects
//! anything that might span more than one table row source. Only the FROM
//! lookup skips quoted text; the other keyword checks do not, so e.g.
//! `SELECT * FROM t WHERE note = 'union'` is reported as a set operation.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::types::TableRef;

pub const DEFAULT_SCHEMA: &str = "public";

pub const REASON_NOT_SELECT: &str = "only SELECT statements can be edited";
pub const REASON_MULTI_TABLE: &str = "multi-table statements cannot be edited";
pub const REASON_SET_OPERATION: &str = "set operations cannot be edited";
pub const REASON_AGGREGATE: &str = "aggregated statements cannot be edited";
pub const REASON_NO_TABLE: &str = "could not determine target table";

static SELECT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)^select\b").unwrap());

static JOIN_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\sjoin\s").unwrap());

static SET_OPERATION_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(union|intersect|except)\b").unwrap());

static AGGREGATE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bgroup\s+by\b|\bhaving\b").unwrap());

static FROM_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\bfrom\b").unwrap());

/// `name`, `"Quoted ""Name"""`, or either pair joined by a dot.
static TABLE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^\s+(?P<first>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)(?:\s*\.\s*(?P<second>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*))?"#,
    )
    .unwrap()
});

static ALIAS_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)^\s+(?:as\s+)?(?P<alias>"(?:[^"]|"")+"|[A-Za-z_][A-Za-z0-9_$]*)"#).unwrap()
});

/// Words that may follow a table reference but are not aliases.
const CLAUSE_KEYWORDS: &[&str] = &[
    "where", "order", "limit", "offset", "fetch", "for", "window", "group", "having", "join",
    "inner", "left", "right", "full", "cross", "natural", "on", "using", "union", "intersect",
    "except", "tablesample", "lateral", "returning",
];

/// Editability verdict for a read statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum QueryClassification {
    Editable {
        table: TableRef,
        /// Alias given to the table in the FROM clause, if any.
        alias: Option<String>,
    },
    ReadOnly {
        reason: String,
    },
}

impl QueryClassification {
    fn read_only(reason: &str) -> Self {
        QueryClassification::ReadOnly {
            reason: reason.to_string(),
        }
    }

    pub fn is_editable(&self) -> bool {
        matches!(self, QueryClassification::Editable { .. })
    }

    pub fn table(&self) -> Option<&TableRef> {
        match self {
            QueryClassification::Editable { table, .. } => Some(table),
            QueryClassification::ReadOnly { .. } => None,
        }
    }

    pub fn reason(&self) -> Option<&str> {
        match self {
            QueryClassification::ReadOnly { reason } => Some(reason),
            QueryClassification::Editable { .. } => None,
        }
    }
}

/// Classify `sql`. The first failing check decides the reason.
pub fn analyze(sql: &str) -> QueryClassification {
    let sql = sql.trim();

    if !SELECT_REGEX.is_match(sql) {
        return QueryClassification::read_only(REASON_NOT_SELECT);
    }
    if JOIN_REGEX.is_match(sql) {
        return QueryClassification::read_only(REASON_MULTI_TABLE);
    }
    if SET_OPERATION_REGEX.is_match(sql) {
        return QueryClassification::read_only(REASON_SET_OPERATION);
    }
    if AGGREGATE_REGEX.is_match(sql) {
        return QueryClassification::read_only(REASON_AGGREGATE);
    }

    match extract_table(sql) {
        TableExtraction::Single { table, alias } => QueryClassification::Editable { table, alias },
        TableExtraction::Multiple => QueryClassification::read_only(REASON_MULTI_TABLE),
        TableExtraction::Unknown => QueryClassification::read_only(REASON_NO_TABLE),
    }
}

enum TableExtraction {
    Single {
        table: TableRef,
        alias: Option<String>,
    },
    Multiple,
    Unknown,
}

fn extract_table(sql: &str) -> TableExtraction {
    // `extract(year from ts)` sits inside parentheses, `'from x'` inside quotes.
    let Some(from) = FROM_REGEX
        .find_iter(sql)
        .find(|m| is_top_level(&sql[..m.start()]))
    else {
        return TableExtraction::Unknown;
    };

    let rest = &sql[from.end()..];
    let Some(caps) = TABLE_REGEX.captures(rest) else {
        return TableExtraction::Unknown;
    };
    let Some(first) = caps.name("first") else {
        return TableExtraction::Unknown;
    };

    let table = match caps.name("second") {
        Some(second) => TableRef::new(
            normalize_identifier(first.as_str()),
            normalize_identifier(second.as_str()),
        ),
        None => TableRef::new(DEFAULT_SCHEMA, normalize_identifier(first.as_str())),
    };

    let mut tail = &rest[caps.get(0).map_or(0, |m| m.end())..];
    let mut alias = None;
    if let Some(alias_caps) = ALIAS_REGEX.captures(tail) {
        if let Some(candidate) = alias_caps.name("alias") {
            let keyword = candidate.as_str().to_lowercase();
            if !CLAUSE_KEYWORDS.contains(&keyword.as_str()) {
                alias = Some(normalize_identifier(candidate.as_str()));
                tail = &tail[candidate.end()..];
            }
        }
    }

    if tail.trim_start().starts_with(',') {
        return TableExtraction::Multiple;
    }

    TableExtraction::Single { table, alias }
}

/// Unquote `"Name"` (un-doubling inner quotes) or fold a bare name to lower case.
pub(crate) fn normalize_identifier(raw: &str) -> String {
    match raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
        Some(inner) => inner.replace("\"\"", "\""),
        None => raw.to_lowercase(),
    }
}

/// Whether the end of `text` is outside every parenthesis and quote.
pub(crate) fn is_top_level(text: &str) -> bool {
    matches!(scan(text), (0, None))
}

/// Parenthesis depth at the end of `text`, ignoring quoted sections, and the
/// quote still open there.
fn scan(text: &str) -> (i32, Option<char>) {
    let mut depth = 0;
    let mut quote: Option<char> = None;
    for ch in text.chars() {
        match (quote, ch) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(ch),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            _ => {}
        }
    }
    (depth, quote)
}
