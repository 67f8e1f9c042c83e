//! Error types for the typecast core library
//!
//! Configuration problems are reported as [`ConfigError`] before any record
//! is processed. Per-record failures surface as [`Error::Cast`] or
//! [`Error::PathNotFound`], and only escape the column dispatcher when the
//! failure policy says so.

use crate::cast::CastError;
use crate::jsonpath::JSONPathError;
use crate::value::Kind;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for typecast operations
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid configuration, detected at setup
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A value could not be converted for a column
    #[error("Cast failed for column '{column}': {source}")]
    Cast {
        column: String,
        #[source]
        source: CastError,
    },

    /// A configured concrete path matched nothing in the document
    #[error("Path not found in column '{column}': {path}")]
    PathNotFound { column: String, path: String },

    /// A record does not line up with the input schema
    #[error("Record has {found} values but the input schema declares {expected} columns")]
    RecordShape { expected: usize, found: usize },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Configuration errors, fatal before any record is processed
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: JSONPathError,
    },

    #[error("Column '{name}' does not exist in the input schema")]
    UnknownColumn { name: String },

    #[error("Column '{name}' is declared more than once in the input schema")]
    DuplicateColumn { name: String },

    #[error("Unknown type '{name}'")]
    UnknownType { name: String },

    #[error("Type {kind} is not supported inside a JSON path: {path}")]
    UnsupportedPathType { path: String, kind: Kind },

    #[error("Path {path} is rooted at column '{column}' of type {kind}; paths apply to json columns only")]
    NotJsonColumn {
        path: String,
        column: String,
        kind: Kind,
    },

    #[error("json_path on column '{column}' requires a json or string column, found {kind}")]
    JsonPathOnScalar { column: String, kind: Kind },

    #[error("Rule for '{target}' is declared more than once")]
    DuplicateRule { target: String },

    #[error("Path {inner} is nested under path {outer}")]
    OverlappingPaths { outer: String, inner: String },

    #[error("Column rule sets both name '{name}' and path '{path}'")]
    ConflictingTarget { name: String, path: String },

    #[error("Column rule needs either `name` or `path`")]
    MissingTarget,

    #[error("Invalid timezone '{name}'")]
    InvalidTimezone { name: String },

    #[error("Invalid date '{value}': expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("Invalid timestamp format '{pattern}': {message}")]
    InvalidTimestampFormat { pattern: String, message: String },

    #[error("Cannot tell the format of configuration file {}", path.display())]
    UnknownFormat { path: PathBuf },

    #[error("Failed to read configuration file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode {format} configuration: {source}")]
    Decode {
        format: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl ConfigError {
    /// Short hint shown next to the error by front ends
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::InvalidPath { source, .. } => source.recovery_suggestions().into_iter().next(),
            Self::UnsupportedPathType { .. } => {
                Some("cast the whole column to timestamp, or use string inside JSON".to_string())
            }
            Self::NotJsonColumn { column, .. } => Some(format!(
                "declare column '{}' as json, or add a rule casting it to json",
                column
            )),
            Self::InvalidTimezone { .. } => {
                Some("use an IANA name such as Asia/Tokyo, UTC, or an offset such as +09:00".to_string())
            }
            _ => None,
        }
    }
}
