//! Value classification
//!
//! First match wins: boolean literal, zero-padded identifier, integral decimal,
//! other decimal, NaN sentinel, list, object, date/time/timestamp,
//! number with non-ASCII digit symbols, then string.

use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use super::datetime::{is_bq_date, is_bq_time, is_bq_timestamp};
use super::normalize::normalize;
use crate::types::TypeTag;

static DECIMAL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:[0-9]+\.?[0-9]*|\.[0-9]+)(?:[eE][+-]?[0-9]+)?$").unwrap());

/// Classify a value that has already been through [`normalize`].
pub fn classify_str(value: &str) -> Option<TypeTag> {
    if value.is_empty() {
        return None;
    }

    if value == "True" || value == "False" {
        return Some(TypeTag::Bool);
    }

    // "007" and "-007" keep their padding; "0" and "0.5" are ordinary numbers
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    if unsigned.len() > 1 && unsigned.starts_with('0') && unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return Some(TypeTag::String);
    }

    if DECIMAL_REGEX.is_match(value) {
        if value.parse::<i64>().is_ok() {
            return Some(TypeTag::Int64);
        }
        if let Ok(number) = value.parse::<f64>() {
            return Some(classify_float(number));
        }
    }

    if value.eq_ignore_ascii_case("nan") {
        return Some(TypeTag::Float64);
    }

    if is_bq_timestamp(value) {
        return Some(TypeTag::Timestamp);
    }
    if is_bq_date(value) {
        return Some(TypeTag::Date);
    }
    if is_bq_time(value) {
        return Some(TypeTag::Time);
    }

    if is_symbolic_number(value) {
        return Some(TypeTag::Numeric);
    }

    Some(TypeTag::String)
}

/// Normalize then classify a raw string cell.
pub fn sample_str(raw: &str) -> Option<TypeTag> {
    normalize(raw).and_then(|v| classify_str(&v))
}

/// Classify a JSON value. Nulls, empty lists and empty objects yield `None`.
pub fn classify_json(value: &Value) -> Option<TypeTag> {
    match value {
        Value::Null => None,
        Value::Bool(_) => Some(TypeTag::Bool),
        Value::Number(n) => {
            if n.is_i64() {
                Some(TypeTag::Int64)
            } else {
                n.as_f64().map(classify_float)
            }
        }
        Value::String(s) => sample_str(s),
        Value::Array(items) if items.is_empty() => None,
        Value::Array(_) => Some(TypeTag::Array),
        Value::Object(map) if map.is_empty() => None,
        Value::Object(_) => Some(TypeTag::Record),
    }
}

/// Sample a named string cell, forcing `_id` columns to STRING.
pub fn sample_field(name: &str, raw: &str) -> Option<TypeTag> {
    sample_str(raw).map(|tag| id_override(name, tag))
}

/// Sample a named JSON value, forcing `_id` columns to STRING.
pub fn sample_json_field(name: &str, value: &Value) -> Option<TypeTag> {
    classify_json(value).map(|tag| id_override(name, tag))
}

fn id_override(name: &str, tag: TypeTag) -> TypeTag {
    if name.contains("_id") && !tag.is_structural() {
        TypeTag::String
    } else {
        tag
    }
}

/// Integral values outside the INT64 range load only as FLOAT64
fn classify_float(number: f64) -> TypeTag {
    const INT64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    let integral = number.is_finite() && number.fract() == 0.0;
    if integral && (-INT64_BOUND..INT64_BOUND).contains(&number) {
        TypeTag::Int64
    } else {
        TypeTag::Float64
    }
}

/// Digits mixed with non-ASCII numeric symbols, such as superscripts ("10³")
fn is_symbolic_number(value: &str) -> bool {
    let mut has_ascii_digit = false;
    let mut has_symbol = false;
    for c in value.chars() {
        if c.is_ascii_digit() {
            has_ascii_digit = true;
        } else if c.is_numeric() {
            has_symbol = true;
        } else if c != '.' && c != '-' {
            return false;
        }
    }
    has_ascii_digit && has_symbol
}
