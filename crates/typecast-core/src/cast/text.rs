//! The string row of the matrix

use super::{CastError, TimestampCodec};
use crate::value::{Kind, Value};

/// Spellings accepted as `true`. Matching is exact and case-sensitive.
pub const TRUE_STRINGS: &[&str] = &[
    "true", "True", "TRUE", "yes", "Yes", "YES", "t", "T", "y", "Y", "on", "On", "ON", "1",
];

/// Spellings accepted as `false`
pub const FALSE_STRINGS: &[&str] = &[
    "false", "False", "FALSE", "no", "No", "NO", "f", "F", "n", "N", "off", "Off", "OFF", "0",
];

pub fn parse_bool(s: &str) -> Option<bool> {
    if TRUE_STRINGS.contains(&s) {
        Some(true)
    } else if FALSE_STRINGS.contains(&s) {
        Some(false)
    } else {
        None
    }
}

pub fn from_text(v: String, target: Kind, codec: &TimestampCodec) -> Result<Value, CastError> {
    match target {
        Kind::Bool => parse_bool(&v)
            .map(Value::Bool)
            .ok_or_else(|| invalid(&v, target, "not a recognized boolean spelling")),
        Kind::Int => v
            .parse::<i64>()
            .map(Value::Int)
            .map_err(|e| invalid(&v, target, e)),
        Kind::Float => v
            .trim()
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|e| invalid(&v, target, e)),
        Kind::Time => codec.parse(&v).map(Value::Time),
        Kind::Json => serde_json::from_str(&v)
            .map(Value::Json)
            .map_err(|e| invalid(&v, target, e)),
        Kind::Str => Ok(Value::Str(v)),
    }
}

fn invalid(v: &str, target: Kind, reason: impl std::fmt::Display) -> CastError {
    CastError::new(Kind::Str, target, format!("{:?}", v)).with_reason(reason.to_string())
}
