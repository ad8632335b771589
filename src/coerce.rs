//! Bidirectional value coercion between raw (string/primitive) cells and
//! rich-typed cells.
//!
//! Post-load inference turns the untyped strings a format decoder produces
//! into booleans, integers, floats, UTC instants, and decoded JSON
//! structures. Pre-dump canonicalization is the inverse: it renders rich
//! values back into the string/primitive forms a format encoder stores.
//!
//! Both directions are total (no coercion decision can fail; ambiguous input
//! is left unchanged) and operate on a clone of the caller's book.

use crate::book::Book;
use crate::cell::{self, CellValue};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde_json::Value;

/// The type-coercion engine.
///
/// Stateless; constructed explicitly and injected wherever a loader or
/// dumper needs it, never reached through a hidden default.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypeCoercion;

impl TypeCoercion {
    #[must_use]
    pub fn new() -> Self {
        TypeCoercion
    }

    /// Replace every raw cell in the book with its inferred rich type.
    ///
    /// The caller's book is never mutated; a typed clone is returned.
    #[must_use]
    pub fn post_load(&self, book: &Book) -> Book {
        let mut typed = book.clone();
        typed.for_each_sheet_mut(|sheet| sheet.map(|cell, _, _| infer(cell)));
        typed
    }

    /// Replace every rich cell in the book with its canonical
    /// string/primitive form.
    ///
    /// The caller's book is never mutated; a canonicalized clone is returned.
    #[must_use]
    pub fn pre_dump(&self, book: &Book) -> Book {
        let mut canonical = book.clone();
        canonical.for_each_sheet_mut(|sheet| sheet.map(|cell, _, _| canonicalize(cell)));
        canonical
    }
}

/// Infer the rich type of a single cell.
///
/// Already-rich values pass through unchanged, which makes inference
/// idempotent. Strings are tried against an ordered chain: empty, numeric,
/// boolean literal, date/time, JSON structure; the first match wins and a
/// string matching nothing is returned as-is.
#[must_use]
pub fn infer(value: &CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::Null,
        CellValue::String(s) if s.is_empty() => CellValue::Null,
        CellValue::String(s) => infer_string(s),
        other => other.clone(),
    }
}

fn infer_string(s: &str) -> CellValue {
    if let Some(numeric) = infer_numeric(s) {
        return numeric;
    }
    if s.eq_ignore_ascii_case("true") {
        return CellValue::Bool(true);
    }
    if s.eq_ignore_ascii_case("false") {
        return CellValue::Bool(false);
    }
    // Anything shorter than the shortest date form cannot be an instant.
    if s.len() >= 6 {
        if let Some(instant) = parse_instant(s) {
            return CellValue::DateTime(instant);
        }
    }
    if s.starts_with('{') || s.starts_with('[') {
        if let Ok(decoded) = serde_json::from_str::<Value>(s) {
            if matches!(decoded, Value::Array(_) | Value::Object(_)) {
                return cell::json_value_to_cell(&decoded);
            }
        }
    }
    CellValue::String(s.to_string())
}

/// Locale-independent numeric-string test.
///
/// A string that survives an exact round trip through an integer cast is an
/// integer; any other parseable, finite number is a float. The finite guard
/// rejects `inf`/`NaN` spellings that the float parser would otherwise
/// accept.
fn infer_numeric(s: &str) -> Option<CellValue> {
    if let Ok(i) = s.parse::<i64>() {
        if i.to_string() == s {
            return Some(CellValue::Int(i));
        }
    }
    match s.parse::<f64>() {
        Ok(f) if f.is_finite() => Some(CellValue::Float(f)),
        _ => None,
    }
}

/// Try the explicit date/time patterns, most common first, then fall back to
/// a permissive parse. Accepted instants are normalized to UTC.
fn parse_instant(s: &str) -> Option<DateTime<Utc>> {
    const DATE_PATTERNS: [&str; 2] = ["%Y-%m-%d", "%d/%m/%Y"];
    const DATETIME_PATTERNS: [&str; 3] = [
        "%Y-%m-%d %H:%M:%S",
        "%d/%m/%Y %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
    ];

    for pattern in DATE_PATTERNS {
        if let Ok(date) = NaiveDate::parse_from_str(s, pattern) {
            return Some(date.and_time(NaiveTime::MIN).and_utc());
        }
    }
    for pattern in DATETIME_PATTERNS {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(s, pattern) {
            return Some(datetime.and_utc());
        }
    }
    if let Ok(with_offset) = DateTime::parse_from_rfc3339(s) {
        return Some(with_offset.with_timezone(&Utc));
    }
    DateTime::parse_from_rfc2822(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Render a single rich cell in its canonical string/primitive form.
///
/// Numerics pass through untouched so the destination format may pick its
/// own representation; strings are already canonical and are unaffected.
#[must_use]
pub fn canonicalize(value: &CellValue) -> CellValue {
    match value {
        CellValue::Null => CellValue::String(String::new()),
        CellValue::Bool(b) => CellValue::String(b.to_string()),
        CellValue::DateTime(dt) => CellValue::String(cell::format_instant(dt)),
        CellValue::List(_) | CellValue::Map(_) => {
            CellValue::String(cell::cell_to_json_value(value).to_string())
        }
        CellValue::Int(_) | CellValue::Float(_) => value.clone(),
        CellValue::String(s) => CellValue::String(s.clone()),
    }
}
