//! Error types for path compilation
//!
//! Paths are compiled once at configuration time, so every error carries the
//! offending input and, where possible, the byte offset of the problem.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use crate::error::ConfigError;
use thiserror::Error;

/// Path compilation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JSONPathError {
    /// Malformed input such as an unterminated bracket
    #[error("Parse error at position {position}: {message}")]
    Parse {
        message: String,
        position: usize,
        input: String,
    },

    /// An unexpected character with the tokens that would have been accepted
    #[error("Syntax error at position {position}: {message}")]
    Syntax {
        message: String,
        position: usize,
        input: String,
        expected: Vec<String>,
        found: String,
    },

    /// Well-formed JSONPath that the restricted dialect does not accept
    #[error("Unsupported feature: {feature}")]
    Unsupported {
        feature: String,
        input: String,
        alternative: Option<String>,
    },

    /// A path that compiles but cannot be used where it appears
    #[error("Invalid path: {message}")]
    InvalidPath {
        message: String,
        path: String,
        suggestion: Option<String>,
    },
}

impl JSONPathError {
    pub fn parse(message: impl Into<String>, position: usize, input: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            position,
            input: input.into(),
        }
    }

    pub fn syntax(
        message: impl Into<String>,
        position: usize,
        input: impl Into<String>,
        expected: Vec<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Syntax {
            message: message.into(),
            position,
            input: input.into(),
            expected,
            found: found.into(),
        }
    }

    pub fn unsupported(
        feature: impl Into<String>,
        input: impl Into<String>,
        alternative: Option<String>,
    ) -> Self {
        Self::Unsupported {
            feature: feature.into(),
            input: input.into(),
            alternative,
        }
    }

    pub fn invalid_path(
        message: impl Into<String>,
        path: impl Into<String>,
        suggestion: Option<String>,
    ) -> Self {
        Self::InvalidPath {
            message: message.into(),
            path: path.into(),
            suggestion,
        }
    }

    /// The path text the error refers to
    pub fn input(&self) -> &str {
        match self {
            Self::Parse { input, .. }
            | Self::Syntax { input, .. }
            | Self::Unsupported { input, .. } => input,
            Self::InvalidPath { path, .. } => path,
        }
    }

    /// Get the error message with a caret under the failing position
    pub fn detailed_message(&self) -> String {
        match self {
            Self::Parse { message, position, input } => {
                let mut result = format!("Parse error at position {}: {}", position, message);
                push_caret(&mut result, input, *position);
                result
            }
            Self::Syntax { message, position, input, expected, found } => {
                let mut result = format!("Syntax error at position {}: {}", position, message);
                result.push_str(&format!("\nExpected one of: {}", expected.join(", ")));
                result.push_str(&format!("\nFound: {}", found));
                push_caret(&mut result, input, *position);
                result
            }
            Self::Unsupported { feature, input, .. } => {
                format!("Unsupported feature in '{}': {}", input, feature)
            }
            Self::InvalidPath { message, path, suggestion } => {
                let mut result = format!("Invalid path '{}': {}", path, message);
                if let Some(suggestion) = suggestion {
                    result.push_str(&format!("\nSuggestion: {}", suggestion));
                }
                result
            }
        }
    }

    /// Get recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            Self::Parse { .. } => vec![
                "Check for unclosed brackets or quotes".to_string(),
                "Paths look like $.column.key[0]".to_string(),
            ],
            Self::Syntax { expected, .. } => {
                vec![format!("Expected one of: {}", expected.join(", "))]
            }
            Self::Unsupported { alternative, .. } => match alternative {
                Some(alt) => vec![format!("Use {} instead", alt)],
                None => vec!["Only properties, indexes and [*] are supported".to_string()],
            },
            Self::InvalidPath { suggestion, .. } => match suggestion {
                Some(s) => vec![s.clone()],
                None => vec!["Check path syntax and property names".to_string()],
            },
        }
    }
}

fn push_caret(result: &mut String, input: &str, position: usize) {
    if !input.is_empty() && position <= input.len() {
        result.push_str(&format!("\nInput: {}", input));
        result.push_str(&format!("\n       {}^", " ".repeat(position)));
    }
}

impl From<JSONPathError> for ConfigError {
    fn from(err: JSONPathError) -> Self {
        ConfigError::InvalidPath {
            path: err.input().to_string(),
            source: err,
        }
    }
}

impl From<JSONPathError> for crate::Error {
    fn from(err: JSONPathError) -> Self {
        crate::Error::Config(err.into())
    }
}
