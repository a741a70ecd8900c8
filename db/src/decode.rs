//! Wire decoder: raw result cells to `CellValue`.
//!
//! Cells arrive as the bytes the server sent plus the column's declared type
//! name. Each type family is decoded from its fixed-width binary layout first;
//! when the width does not match, the bytes are read as text instead, since
//! some paths deliver text-encoded values.
//!
//! PostgreSQL date/time binary values count from 2000-01-01 rather than the
//! Unix epoch.

use std::fmt::Write as _;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::value::CellValue;

/// Seconds between 1970-01-01 and 2000-01-01.
pub const POSTGRES_EPOCH_OFFSET_SECS: i64 = 946_684_800;

const SECS_PER_DAY: i64 = 86_400;
const MICROS_PER_SEC: i64 = 1_000_000;

const INTEGER_TYPES: &[&str] = &[
    "int2",
    "int4",
    "int8",
    "smallint",
    "integer",
    "int",
    "bigint",
    "serial",
    "serial2",
    "serial4",
    "serial8",
    "smallserial",
    "bigserial",
];

const FLOAT_TYPES: &[&str] = &["float4", "float8", "real", "double precision", "float"];

/// Decoding family of a declared type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeFamily {
    Integer,
    Float,
    Numeric,
    Boolean,
    Timestamp,
    Date,
    Time,
    Uuid,
    Json,
    Bytea,
    Other,
}

impl TypeFamily {
    /// Classify a type name such as `int8`, `timestamp with time zone` or
    /// `numeric(10,2)`.
    ///
    /// Order matters: `timestamp` names also contain `time`.
    pub fn classify(type_name: &str) -> Self {
        let name = type_name.trim().to_ascii_lowercase();
        let base = name.split('(').next().unwrap_or_default().trim();

        if INTEGER_TYPES.contains(&base) {
            TypeFamily::Integer
        } else if FLOAT_TYPES.contains(&base) {
            TypeFamily::Float
        } else if base == "numeric" || base == "decimal" {
            TypeFamily::Numeric
        } else if base == "bool" || base == "boolean" {
            TypeFamily::Boolean
        } else if name.contains("timestamp") {
            TypeFamily::Timestamp
        } else if base == "date" {
            TypeFamily::Date
        } else if name.contains("time") {
            TypeFamily::Time
        } else if base == "uuid" {
            TypeFamily::Uuid
        } else if base == "json" || base == "jsonb" {
            TypeFamily::Json
        } else if base == "bytea" {
            TypeFamily::Bytea
        } else {
            TypeFamily::Other
        }
    }
}

/// Decode one cell. `None` is SQL NULL regardless of the declared type.
pub fn decode(raw: Option<&[u8]>, type_name: &str) -> CellValue {
    let Some(bytes) = raw else {
        return CellValue::Null;
    };

    match TypeFamily::classify(type_name) {
        TypeFamily::Integer => decode_integer(bytes),
        TypeFamily::Float => decode_float(bytes),
        TypeFamily::Numeric => decode_numeric(bytes),
        TypeFamily::Boolean => decode_bool(bytes),
        TypeFamily::Timestamp => decode_timestamp(bytes),
        TypeFamily::Date => decode_date(bytes),
        TypeFamily::Time => decode_time(bytes),
        TypeFamily::Uuid => decode_uuid(bytes),
        TypeFamily::Json => decode_json(bytes),
        TypeFamily::Bytea => CellValue::RawBytes(bytes.to_vec()),
        TypeFamily::Other => from_text(bytes, |_| None),
    }
}

/// Read `bytes` as UTF-8 and try `parse`; unparsed text stays `Text`, and
/// bytes that are not UTF-8 at all become `RawBytes`.
fn from_text(bytes: &[u8], parse: impl FnOnce(&str) -> Option<CellValue>) -> CellValue {
    match std::str::from_utf8(bytes) {
        Ok(text) => parse(text).unwrap_or_else(|| CellValue::Text(text.to_string())),
        Err(_) => CellValue::RawBytes(bytes.to_vec()),
    }
}

fn decode_integer(bytes: &[u8]) -> CellValue {
    if let Ok(b) = <[u8; 2]>::try_from(bytes) {
        return CellValue::Integer(i16::from_be_bytes(b).into());
    }
    if let Ok(b) = <[u8; 4]>::try_from(bytes) {
        return CellValue::Integer(i32::from_be_bytes(b).into());
    }
    if let Ok(b) = <[u8; 8]>::try_from(bytes) {
        return CellValue::Integer(i64::from_be_bytes(b));
    }
    from_text(bytes, |text| text.trim().parse().ok().map(CellValue::Integer))
}

fn decode_float(bytes: &[u8]) -> CellValue {
    if let Ok(b) = <[u8; 4]>::try_from(bytes) {
        return CellValue::Float(f32::from_be_bytes(b).into());
    }
    if let Ok(b) = <[u8; 8]>::try_from(bytes) {
        return CellValue::Float(f64::from_be_bytes(b));
    }
    from_text(bytes, |text| text.trim().parse().ok().map(CellValue::Float))
}

fn decode_numeric(bytes: &[u8]) -> CellValue {
    let parse = |text: &str| -> CellValue {
        text.trim()
            .parse::<f64>()
            .map(CellValue::Float)
            .unwrap_or_else(|_| CellValue::Text(text.to_string()))
    };

    match numeric_to_text(bytes) {
        Some(text) => parse(&text),
        None => from_text(bytes, |text| Some(parse(text))),
    }
}

/// Render the binary NUMERIC layout as decimal text.
///
/// Layout: `ndigits:i16, weight:i16, sign:u16, dscale:u16`, then `ndigits`
/// base-10000 digits as `i16`. `weight` is the power of 10000 of the first
/// digit.
pub fn numeric_to_text(bytes: &[u8]) -> Option<String> {
    let header = |i: usize| u16::from_be_bytes([bytes[i], bytes[i + 1]]);

    if bytes.len() < 8 {
        return None;
    }
    let ndigits = usize::try_from(header(0) as i16).ok()?;
    let weight = i32::from(header(2) as i16);
    let sign = header(4);
    let dscale = usize::from(header(6));

    if bytes.len() != 8 + ndigits * 2 {
        return None;
    }

    match sign {
        0xC000 => return Some("NaN".to_string()),
        0xD000 => return Some("Infinity".to_string()),
        0xF000 => return Some("-Infinity".to_string()),
        0x0000 | 0x4000 => {}
        _ => return None,
    }

    let digits: Vec<i16> = (0..ndigits).map(|i| header(8 + i * 2) as i16).collect();
    let digit_at = |i: i32| -> i16 {
        usize::try_from(i)
            .ok()
            .and_then(|i| digits.get(i).copied())
            .unwrap_or(0)
    };

    let mut out = String::new();
    if sign == 0x4000 {
        out.push('-');
    }

    if weight < 0 {
        out.push('0');
    } else {
        for i in 0..=weight {
            let digit = digit_at(i);
            if i == 0 {
                let _ = write!(out, "{}", digit);
            } else {
                let _ = write!(out, "{:04}", digit);
            }
        }
    }

    if dscale > 0 {
        let mut fraction = String::new();
        let mut i = weight + 1;
        while fraction.len() < dscale {
            let _ = write!(fraction, "{:04}", digit_at(i));
            i += 1;
        }
        fraction.truncate(dscale);
        out.push('.');
        out.push_str(&fraction);
    }

    Some(out)
}

/// Text boolean rule: `t`, `true` and `1` are true, anything else false.
pub fn parse_bool_text(text: &str) -> bool {
    matches!(text.trim().to_ascii_lowercase().as_str(), "t" | "true" | "1")
}

fn decode_bool(bytes: &[u8]) -> CellValue {
    match bytes {
        // A single printable byte is text ("t", "f", "1", "0"), not binary.
        [b] if !b.is_ascii_alphanumeric() => CellValue::Boolean(*b != 0),
        _ => from_text(bytes, |text| Some(CellValue::Boolean(parse_bool_text(text)))),
    }
}

/// Convert microseconds since 2000-01-01 to an absolute instant.
pub fn timestamp_from_pg_micros(micros: i64) -> Option<DateTime<Utc>> {
    let secs = micros
        .div_euclid(MICROS_PER_SEC)
        .checked_add(POSTGRES_EPOCH_OFFSET_SECS)?;
    let nanos = u32::try_from(micros.rem_euclid(MICROS_PER_SEC) * 1_000).ok()?;
    DateTime::from_timestamp(secs, nanos)
}

/// Convert days since 2000-01-01 to midnight UTC of that day.
pub fn date_from_pg_days(days: i32) -> Option<DateTime<Utc>> {
    let secs = i64::from(days) * SECS_PER_DAY + POSTGRES_EPOCH_OFFSET_SECS;
    DateTime::from_timestamp(secs, 0)
}

/// Parse the textual timestamp forms PostgreSQL and RFC 3339 produce.
pub fn parse_timestamp_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = DateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(ts.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// Parse `YYYY-MM-DD` as midnight UTC.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn decode_timestamp(bytes: &[u8]) -> CellValue {
    if let Ok(b) = <[u8; 8]>::try_from(bytes) {
        let micros = i64::from_be_bytes(b);
        return match timestamp_from_pg_micros(micros) {
            Some(ts) => CellValue::Timestamp(ts),
            None => CellValue::Text(infinity_text(micros > 0)),
        };
    }
    from_text(bytes, |text| parse_timestamp_text(text).map(CellValue::Timestamp))
}

fn decode_date(bytes: &[u8]) -> CellValue {
    if let Ok(b) = <[u8; 4]>::try_from(bytes) {
        let days = i32::from_be_bytes(b);
        return match date_from_pg_days(days) {
            Some(ts) => CellValue::Timestamp(ts),
            None => CellValue::Text(infinity_text(days > 0)),
        };
    }
    from_text(bytes, |text| parse_date_text(text).map(CellValue::Timestamp))
}

fn infinity_text(positive: bool) -> String {
    if positive { "infinity" } else { "-infinity" }.to_string()
}

/// `time` is 8 bytes of microseconds since midnight; `timetz` appends a
/// 4-byte zone offset, which is ignored.
fn decode_time(bytes: &[u8]) -> CellValue {
    if bytes.len() == 8 || bytes.len() == 12 {
        let mut b = [0u8; 8];
        b.copy_from_slice(&bytes[..8]);
        let total_secs = i64::from_be_bytes(b).div_euclid(MICROS_PER_SEC);
        return CellValue::Text(format!(
            "{:02}:{:02}:{:02}",
            total_secs / 3600,
            (total_secs % 3600) / 60,
            total_secs % 60
        ));
    }
    from_text(bytes, |_| None)
}

fn decode_uuid(bytes: &[u8]) -> CellValue {
    if let Ok(id) = Uuid::from_slice(bytes) {
        return CellValue::UniqueId(id);
    }
    from_text(bytes, |text| Uuid::parse_str(text.trim()).ok().map(CellValue::UniqueId))
}

/// JSON is kept verbatim. Binary `jsonb` carries a leading version byte (1),
/// which is never valid at the start of JSON text.
fn decode_json(bytes: &[u8]) -> CellValue {
    let body = match bytes {
        [1, rest @ ..] => rest,
        _ => bytes,
    };
    from_text(body, |text| Some(CellValue::StructuredText(text.to_string())))
}
