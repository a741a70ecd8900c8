//! Dynamically-typed cell values.
//!
//! `CellValue` is what every decoded result cell becomes. It renders back to
//! text for display, to an injection-safe SQL literal for generated
//! statements, and to a natural JSON value for structured output.

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::decode::{parse_bool_text, parse_date_text, parse_timestamp_text, TypeFamily};
use crate::escape::quote_literal;

/// A single decoded database value.
#[derive(Debug, Clone)]
pub enum CellValue {
    Null,
    Text(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Timestamp(DateTime<Utc>),
    RawBytes(Vec<u8>),
    UniqueId(Uuid),
    /// JSON-family payload kept as the server sent it.
    StructuredText(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Variant name for messages and debugging.
    pub fn type_name(&self) -> &'static str {
        match self {
            CellValue::Null => "null",
            CellValue::Text(_) => "text",
            CellValue::Integer(_) => "integer",
            CellValue::Float(_) => "float",
            CellValue::Boolean(_) => "boolean",
            CellValue::Timestamp(_) => "timestamp",
            CellValue::RawBytes(_) => "bytes",
            CellValue::UniqueId(_) => "uuid",
            CellValue::StructuredText(_) => "json",
        }
    }

    /// Borrow the text payload of `Text` and `StructuredText`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) | CellValue::StructuredText(s) => Some(s),
            _ => None,
        }
    }

    /// Integers as-is, floats truncated toward zero.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Integer(i) => Some(*i as f64),
            CellValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Render as a PostgreSQL literal that is safe to splice into SQL text.
    pub fn sql_literal(&self) -> String {
        match self {
            CellValue::Null => "NULL".to_string(),
            CellValue::Text(s) | CellValue::StructuredText(s) => quote_literal(s),
            CellValue::Integer(i) => i.to_string(),
            CellValue::Float(f) if f.is_nan() => "'NaN'".to_string(),
            CellValue::Float(f) if f.is_infinite() => {
                if f.is_sign_positive() {
                    "'Infinity'".to_string()
                } else {
                    "'-Infinity'".to_string()
                }
            }
            CellValue::Float(f) => f.to_string(),
            CellValue::Boolean(true) => "TRUE".to_string(),
            CellValue::Boolean(false) => "FALSE".to_string(),
            CellValue::Timestamp(ts) => quote_literal(&format_timestamp(ts)),
            CellValue::RawBytes(bytes) => format!("'\\x{}'", hex::encode(bytes)),
            CellValue::UniqueId(id) => quote_literal(&id.hyphenated().to_string()),
        }
    }

    /// Parse operator-typed text for a column of `type_name`.
    ///
    /// The bare keyword `NULL` yields `Null`. Text that does not fit the
    /// column's type family is kept as `Text` and left to the server to reject.
    pub fn parse_input(text: &str, type_name: &str) -> CellValue {
        if text == "NULL" {
            return CellValue::Null;
        }

        let parsed = match TypeFamily::classify(type_name) {
            TypeFamily::Integer => text.trim().parse::<i64>().ok().map(CellValue::Integer),
            TypeFamily::Float | TypeFamily::Numeric => {
                text.trim().parse::<f64>().ok().map(CellValue::Float)
            }
            TypeFamily::Boolean => Some(CellValue::Boolean(parse_bool_text(text))),
            TypeFamily::Timestamp => parse_timestamp_text(text).map(CellValue::Timestamp),
            TypeFamily::Date => parse_date_text(text)
                .or_else(|| parse_timestamp_text(text))
                .map(CellValue::Timestamp),
            TypeFamily::Uuid => Uuid::parse_str(text.trim()).ok().map(CellValue::UniqueId),
            TypeFamily::Json => Some(CellValue::StructuredText(text.to_string())),
            TypeFamily::Bytea => text
                .strip_prefix("\\x")
                .and_then(|digits| hex::decode(digits).ok())
                .map(CellValue::RawBytes),
            TypeFamily::Time | TypeFamily::Other => None,
        };

        parsed.unwrap_or_else(|| CellValue::Text(text.to_string()))
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => f.write_str("NULL"),
            CellValue::Text(s) | CellValue::StructuredText(s) => f.write_str(s),
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Float(v) => write!(f, "{}", v),
            CellValue::Boolean(b) => write!(f, "{}", b),
            CellValue::Timestamp(ts) => f.write_str(&format_timestamp(ts)),
            CellValue::RawBytes(bytes) => write!(f, "\\x{}", hex::encode(bytes)),
            CellValue::UniqueId(id) => write!(f, "{}", id.hyphenated()),
        }
    }
}

// Floats compare by bit pattern so that Eq and Hash agree (NaN == NaN).
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Text(a), CellValue::Text(b)) => a == b,
            (CellValue::Integer(a), CellValue::Integer(b)) => a == b,
            (CellValue::Float(a), CellValue::Float(b)) => a.to_bits() == b.to_bits(),
            (CellValue::Boolean(a), CellValue::Boolean(b)) => a == b,
            (CellValue::Timestamp(a), CellValue::Timestamp(b)) => a == b,
            (CellValue::RawBytes(a), CellValue::RawBytes(b)) => a == b,
            (CellValue::UniqueId(a), CellValue::UniqueId(b)) => a == b,
            (CellValue::StructuredText(a), CellValue::StructuredText(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for CellValue {}

impl Hash for CellValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Null => {}
            CellValue::Text(s) | CellValue::StructuredText(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Boolean(b) => b.hash(state),
            CellValue::Timestamp(ts) => ts.hash(state),
            CellValue::RawBytes(bytes) => bytes.hash(state),
            CellValue::UniqueId(id) => id.hash(state),
        }
    }
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            CellValue::Null => serializer.serialize_none(),
            CellValue::Text(s) | CellValue::StructuredText(s) => serializer.serialize_str(s),
            CellValue::Integer(i) => serializer.serialize_i64(*i),
            CellValue::Float(f) => serializer.serialize_f64(*f),
            CellValue::Boolean(b) => serializer.serialize_bool(*b),
            CellValue::Timestamp(_) | CellValue::RawBytes(_) | CellValue::UniqueId(_) => {
                serializer.collect_str(self)
            }
        }
    }
}
