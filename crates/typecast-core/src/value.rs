//! Value model for record columns
//!
//! Every column of a record carries one of six value kinds. `Value` is the
//! closed union over those kinds; null is not a value and is represented as
//! `Option::None` by the column dispatcher.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use crate::cast::time::Zone;
use crate::error::ConfigError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// JSON document node. Object key order is preserved.
pub type JsonNode = serde_json::Value;

/// The six value kinds a column or a cast target can have
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    #[serde(rename = "boolean", alias = "bool")]
    Bool,
    #[serde(rename = "long", alias = "int", alias = "integer")]
    Int,
    #[serde(rename = "double", alias = "float")]
    Float,
    #[serde(rename = "string")]
    Str,
    #[serde(rename = "timestamp")]
    Time,
    #[serde(rename = "json")]
    Json,
}

impl Kind {
    /// All kinds, in matrix order
    pub const ALL: [Kind; 6] = [
        Kind::Bool,
        Kind::Int,
        Kind::Float,
        Kind::Str,
        Kind::Time,
        Kind::Json,
    ];

    /// Name used in configuration files and messages
    pub fn name(self) -> &'static str {
        match self {
            Kind::Bool => "boolean",
            Kind::Int => "long",
            Kind::Float => "double",
            Kind::Str => "string",
            Kind::Time => "timestamp",
            Kind::Json => "json",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "boolean" | "bool" => Ok(Kind::Bool),
            "long" | "int" | "integer" => Ok(Kind::Int),
            "double" | "float" => Ok(Kind::Float),
            "string" => Ok(Kind::Str),
            "timestamp" => Ok(Kind::Time),
            "json" => Ok(Kind::Json),
            other => Err(ConfigError::UnknownType {
                name: other.to_string(),
            }),
        }
    }
}

/// An instant with nanosecond precision plus the zone it was read in, if any.
///
/// Two timestamps are equal when they denote the same instant; the zone hint
/// does not take part in comparisons and never affects formatting.
#[derive(Debug, Clone, Copy)]
pub struct Timestamp {
    instant: DateTime<Utc>,
    zone: Option<Zone>,
}

impl Timestamp {
    /// Build from epoch seconds and a nanosecond adjustment (`0..1_000_000_000`)
    pub fn from_epoch(seconds: i64, nanos: u32) -> Option<Self> {
        DateTime::from_timestamp(seconds, nanos).map(Self::from_instant)
    }

    pub fn from_instant(instant: DateTime<Utc>) -> Self {
        Self {
            instant,
            zone: None,
        }
    }

    /// Attach the zone the value was interpreted in
    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = Some(zone);
        self
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.instant
    }

    pub fn zone(&self) -> Option<Zone> {
        self.zone
    }

    /// Whole seconds since the epoch, rounded toward negative infinity
    pub fn epoch_second(&self) -> i64 {
        self.instant.timestamp()
    }

    /// Nanoseconds past `epoch_second`
    pub fn nano(&self) -> u32 {
        self.instant.timestamp_subsec_nanos()
    }
}

impl PartialEq for Timestamp {
    fn eq(&self, other: &Self) -> bool {
        self.instant == other.instant
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.instant.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }
}

/// A typed, non-null column value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Time(Timestamp),
    Json(JsonNode),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Bool(_) => Kind::Bool,
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Str(_) => Kind::Str,
            Value::Time(_) => Kind::Time,
            Value::Json(_) => Kind::Json,
        }
    }

    pub fn as_timestamp(&self) -> Option<&Timestamp> {
        match self {
            Value::Time(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{:?}", v),
            Value::Str(v) => write!(f, "{:?}", v),
            Value::Time(v) => write!(f, "{}", v),
            Value::Json(v) => write!(f, "{}", v),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<Timestamp> for Value {
    fn from(v: Timestamp) -> Self {
        Value::Time(v)
    }
}

impl From<JsonNode> for Value {
    fn from(v: JsonNode) -> Self {
        Value::Json(v)
    }
}
