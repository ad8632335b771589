use chrono::{DateTime, NaiveTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Represents a cell value in a sheet.
///
/// `List` and `Map` hold decoded nested structures (JSON-shaped data); once
/// produced they are carried through unchanged by both coercion directions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    List(Vec<CellValue>),
    Map(IndexMap<String, CellValue>),
}

impl CellValue {
    /// Check if the value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    /// Try to get the value as a boolean
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            CellValue::Int(i) => Some(*i != 0),
            CellValue::Float(f) => Some(*f != 0.0),
            CellValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as an integer
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            CellValue::Float(f) => Some(*f as i64),
            CellValue::Bool(b) => Some(i64::from(*b)),
            CellValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a float
    #[must_use]
    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            CellValue::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            CellValue::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Try to get the value as a date/time instant
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime<Utc>> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Get the value as a string.
    ///
    /// Instants render in their canonical form (`Y-m-d` when the time of day
    /// is zero, otherwise `Y-m-dTH:M:S`); lists and maps render as JSON.
    #[must_use]
    pub fn as_str(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(i) => i.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
            CellValue::DateTime(dt) => format_instant(dt),
            CellValue::List(_) | CellValue::Map(_) => cell_to_json_value(self).to_string(),
        }
    }
}

/// Format an instant in canonical form: date-only when the time-of-day
/// component (including sub-seconds) is exactly zero.
pub(crate) fn format_instant(dt: &DateTime<Utc>) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// Convert a serde_json Value to a CellValue
pub(crate) fn json_value_to_cell(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Null,
        Value::Bool(b) => CellValue::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Int(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::Float(f)
            } else {
                CellValue::String(n.to_string())
            }
        }
        Value::String(s) => CellValue::String(s.clone()),
        Value::Array(items) => CellValue::List(items.iter().map(json_value_to_cell).collect()),
        Value::Object(map) => CellValue::Map(
            map.iter()
                .map(|(k, v)| (k.clone(), json_value_to_cell(v)))
                .collect(),
        ),
    }
}

/// Convert a CellValue to a serde_json Value
pub(crate) fn cell_to_json_value(cell: &CellValue) -> Value {
    match cell {
        CellValue::Null => Value::Null,
        CellValue::Bool(b) => Value::Bool(*b),
        CellValue::Int(i) => Value::Number((*i).into()),
        CellValue::Float(f) => {
            // from_f64 returns None for NaN and Infinity
            // Fall back to string representation to preserve data
            serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or_else(|| Value::String(f.to_string()))
        }
        CellValue::String(s) => Value::String(s.clone()),
        CellValue::DateTime(dt) => Value::String(format_instant(dt)),
        CellValue::List(items) => Value::Array(items.iter().map(cell_to_json_value).collect()),
        CellValue::Map(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), cell_to_json_value(v)))
                .collect(),
        ),
    }
}

impl Default for CellValue {
    fn default() -> Self {
        CellValue::Null
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => write!(f, ""),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Int(i) => write!(f, "{i}"),
            CellValue::Float(fl) => write!(f, "{fl}"),
            CellValue::String(s) => write!(f, "{s}"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        CellValue::Bool(b)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Int(i)
    }
}

impl From<i32> for CellValue {
    fn from(i: i32) -> Self {
        CellValue::Int(i64::from(i))
    }
}

impl From<f64> for CellValue {
    fn from(f: f64) -> Self {
        CellValue::Float(f)
    }
}

impl From<f32> for CellValue {
    fn from(f: f32) -> Self {
        CellValue::Float(f64::from(f))
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::String(s)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::String(s.to_string())
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(dt: DateTime<Utc>) -> Self {
        CellValue::DateTime(dt)
    }
}

impl From<Vec<CellValue>> for CellValue {
    fn from(items: Vec<CellValue>) -> Self {
        CellValue::List(items)
    }
}

impl From<IndexMap<String, CellValue>> for CellValue {
    fn from(map: IndexMap<String, CellValue>) -> Self {
        CellValue::Map(map)
    }
}

impl<T: Into<CellValue>> From<Option<T>> for CellValue {
    fn from(opt: Option<T>) -> Self {
        match opt {
            Some(v) => v.into(),
            None => CellValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::approx_constant)]
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_default_is_null() {
        assert_eq!(CellValue::default(), CellValue::Null);
        assert!(CellValue::Null.is_null());
        assert!(!CellValue::Int(0).is_null());
    }

    #[test]
    fn test_conversions() {
        assert_eq!(CellValue::Int(42).as_float(), Some(42.0));
        assert_eq!(CellValue::Float(3.14).as_int(), Some(3));
        assert_eq!(CellValue::Bool(true).as_int(), Some(1));
        assert_eq!(CellValue::String("42".to_string()).as_int(), Some(42));
        assert_eq!(CellValue::Null.as_int(), None);
        assert_eq!(CellValue::List(vec![]).as_float(), None);
    }

    #[test]
    fn test_from_impls() {
        assert_eq!(CellValue::from(true), CellValue::Bool(true));
        assert_eq!(CellValue::from(7i32), CellValue::Int(7));
        assert_eq!(CellValue::from(2.5f32), CellValue::Float(2.5));
        assert_eq!(CellValue::from("x"), CellValue::String("x".to_string()));
        assert_eq!(CellValue::from(None::<i64>), CellValue::Null);
        assert_eq!(CellValue::from(Some(3i64)), CellValue::Int(3));
    }

    #[test]
    fn test_as_str_scalars() {
        assert_eq!(CellValue::Null.as_str(), "");
        assert_eq!(CellValue::Bool(false).as_str(), "false");
        assert_eq!(CellValue::Int(-5).as_str(), "-5");
        assert_eq!(CellValue::Float(1.5).as_str(), "1.5");
    }

    #[test]
    fn test_as_str_datetime() {
        let midnight = Utc.with_ymd_and_hms(2025, 3, 12, 0, 0, 0).unwrap();
        assert_eq!(CellValue::DateTime(midnight).as_str(), "2025-03-12");

        let afternoon = Utc.with_ymd_and_hms(2025, 3, 12, 14, 30, 45).unwrap();
        assert_eq!(
            CellValue::DateTime(afternoon).as_str(),
            "2025-03-12T14:30:45"
        );
    }

    #[test]
    fn test_as_str_composites() {
        let list = CellValue::List(vec![CellValue::Int(1), CellValue::Int(2)]);
        assert_eq!(list.as_str(), "[1,2]");

        let mut map = IndexMap::new();
        map.insert("key".to_string(), CellValue::String("value".to_string()));
        assert_eq!(CellValue::Map(map).as_str(), "{\"key\":\"value\"}");
    }

    #[test]
    fn test_json_value_round_trip() {
        let json: Value = serde_json::from_str(r#"{"a":[1,2.5,null],"b":"x"}"#).unwrap();
        let cell = json_value_to_cell(&json);
        assert!(matches!(cell, CellValue::Map(_)));
        assert_eq!(cell_to_json_value(&cell), json);
    }

    #[test]
    fn test_non_finite_floats_encode_as_strings() {
        let encoded = cell_to_json_value(&CellValue::Float(f64::NAN));
        assert_eq!(encoded, Value::String("NaN".to_string()));
    }

    #[test]
    fn test_display_matches_as_str() {
        let values = vec![
            CellValue::Null,
            CellValue::Bool(true),
            CellValue::Int(9),
            CellValue::String("text".to_string()),
            CellValue::List(vec![CellValue::Int(1)]),
        ];
        for v in values {
            assert_eq!(v.to_string(), v.as_str());
        }
    }
}
