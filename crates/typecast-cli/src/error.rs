//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;
use typecast_core::{ConfigError, JSONPathError};

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from typecast-core
    #[error("{0}")]
    Core(#[from] typecast_core::Error),

    /// Invalid job file
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// An input line that does not decode against the input schema
    #[error("Invalid record on line {line}: {message}")]
    InvalidRecord { line: usize, message: String },

    /// A record the dispatcher rejected under the strict policy
    #[error("Record on line {line} failed: {source}")]
    Record {
        line: usize,
        #[source]
        source: typecast_core::Error,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a generic error with message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    pub fn invalid_record(line: usize, message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            line,
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            Self::Core(_) => 2,
            Self::Config(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::InvalidRecord { .. } => 5,
            Self::Record { .. } => 6,
            Self::Json(_) => 7,
            Self::Yaml(_) => 8,
            Self::Other { .. } => 99,
        }
    }

    /// The path error behind an invalid rule, if any
    pub fn path_error(&self) -> Option<&JSONPathError> {
        match self {
            Self::Config(ConfigError::InvalidPath { source, .. })
            | Self::Core(typecast_core::Error::Config(ConfigError::InvalidPath { source, .. })) => Some(source),
            _ => None,
        }
    }

    /// Hint shown under the error message
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::Config(err) | Self::Core(typecast_core::Error::Config(err)) => err.suggestion(),
            Self::Record { .. } => {
                Some("set stop_on_invalid_record: false to null failed columns instead".to_string())
            }
            _ => None,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    use colored::Colorize;

    let mut message = if use_color {
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    };

    if let Some(path_error) = error.path_error() {
        for line in path_error.detailed_message().lines() {
            message.push_str("\n  ");
            message.push_str(line);
        }
    }

    if let Some(hint) = error.suggestion() {
        if use_color {
            message.push_str(&format!("\n  {} {}", "hint:".yellow(), hint));
        } else {
            message.push_str(&format!("\n  hint: {}", hint));
        }
    }
    message
}
