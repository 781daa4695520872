// 🧹 Field Normalizer
// Total conversions from raw JSON values into clean typed values.
//
// Every cleaner returns `None` ("absent") instead of failing. The one
// exception is `strict_int`, which backs the integer columns where a
// present-but-garbage value must reject the whole record.

use crate::error::{EtlError, Result};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// One raw input record: field name → arbitrary JSON value
pub type RawRecord = Map<String, Value>;

// ============================================================================
// LOOKUP
// ============================================================================

/// Resolve a logical attribute through its ordered alias list.
///
/// The first candidate that is present and non-null wins.
pub fn lookup<'a>(record: &'a RawRecord, candidates: &[&str]) -> Option<&'a Value> {
    candidates
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|value| !value.is_null())
}

// ============================================================================
// CLEANERS
// ============================================================================

pub fn clean_string(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string().trim().to_string()),
    }
}

/// Non-finite input ("NaN", "inf") counts as absent
pub fn clean_numeric(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|f| f.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Only `YYYY-MM-DD` strings are understood; anything else is absent
pub fn clean_date(value: Option<&Value>) -> Option<NaiveDate> {
    match value? {
        Value::String(s) if !s.is_empty() => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// Amenity flags. Absent means false.
pub fn clean_bool(value: Option<&Value>) -> bool {
    match value {
        None => false,
        Some(Value::String(s)) => !matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "" | "false" | "no" | "n" | "0"
        ),
        Some(other) => is_truthy(other),
    }
}

pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

// ============================================================================
// TRUTHINESS + STRICT INTEGERS
// ============================================================================

/// Null, false, zero, "" and empty containers are falsy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Integer conversion for fields where garbage must fail the record.
///
/// Floats truncate toward zero; strings must hold a whole integer.
pub fn strict_int(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(i)
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                    .map(|f| f.trunc() as i64)
                    .ok_or_else(|| EtlError::transform(field, format!("{} is out of range", n)))
            }
        }
        Value::Bool(b) => Ok(i64::from(*b)),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| EtlError::transform(field, format!("'{}' is not an integer", s))),
        other => Err(EtlError::transform(
            field,
            format!("expected an integer, found {}", other),
        )),
    }
}

/// "Zero means missing": parse only when the resolved value is truthy
pub fn optional_int(record: &RawRecord, field: &str, candidates: &[&str]) -> Result<Option<i64>> {
    match lookup(record, candidates) {
        Some(value) if is_truthy(value) => strict_int(field, value).map(Some),
        _ => Ok(None),
    }
}

/// True when every listed field is present and non-null
pub fn has_required_fields(record: &RawRecord, fields: &[String]) -> bool {
    fields
        .iter()
        .all(|field| record.get(field).map(|v| !v.is_null()).unwrap_or(false))
}
