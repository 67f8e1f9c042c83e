//! The cast matrix
//!
//! [`cast`] converts any [`Value`] to any target [`Kind`]. The matrix is
//! total: every (source, target) pair is either a defined conversion or a
//! [`CastError`], never a panic and never a placeholder value.
//!
//! | source \ target | boolean | long | double | string | timestamp | json |
//! |---|---|---|---|---|---|---|
//! | boolean | = | 0/1 | - | text | - | - |
//! | long | 0/1 only | = | widen | text | epoch s | - |
//! | double | - | truncate | = | text | epoch s + ns | - |
//! | string | spellings | parse | parse | = | codec | parse |
//! | timestamp | - | epoch s | s + ns | codec | = | - |
//! | json (doc) | - | - | - | compact | - | = |
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

pub mod json;
pub mod scalar;
pub mod text;
pub mod time;


use crate::value::{Kind, Value};
use std::fmt;
use thiserror::Error;

pub use time::{TimestampCodec, Zone, DEFAULT_DATE, DEFAULT_TIMESTAMP_FORMAT};

/// A conversion the matrix does not define, or input it cannot read
#[derive(Error, Debug, Clone, PartialEq)]
#[error(
    "cannot convert {from} to {to} for value {value}{}{}",
    .reason.as_ref().map(|r| format!(" ({})", r)).unwrap_or_default(),
    .path.as_ref().map(|p| format!(" at {}", p)).unwrap_or_default()
)]
pub struct CastError {
    pub from: Kind,
    pub to: Kind,
    pub value: String,
    pub reason: Option<String>,
    pub path: Option<String>,
}

impl CastError {
    pub fn new(from: Kind, to: Kind, value: impl fmt::Display) -> Self {
        Self {
            from,
            to,
            value: value.to_string(),
            reason: None,
            path: None,
        }
    }

    /// A pair the matrix leaves undefined
    pub fn unsupported(from: Kind, to: Kind, value: impl fmt::Display) -> Self {
        Self::new(from, to, value).with_reason("no conversion defined")
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Record the JSON path of the leaf that failed
    pub fn at(mut self, path: impl fmt::Display) -> Self {
        self.path = Some(path.to_string());
        self
    }
}

/// Convert `value` to `target`.
///
/// `codec` supplies the timestamp pattern, zone and default date used by the
/// string/timestamp conversions; other conversions ignore it.
pub fn cast(value: Value, target: Kind, codec: &TimestampCodec) -> Result<Value, CastError> {
    match value {
        Value::Bool(v) => scalar::from_bool(v, target),
        Value::Int(v) => scalar::from_int(v, target),
        Value::Float(v) => scalar::from_float(v, target),
        Value::Str(v) => text::from_text(v, target, codec),
        Value::Time(v) => time::from_timestamp(v, target, codec),
        Value::Json(v) => json::from_json(v, target, codec),
    }
}
