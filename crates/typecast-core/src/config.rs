//! Filter configuration
//!
//! The configuration names the columns and JSON paths to retype, the failure
//! policy, and the timestamp defaults. It can be written as YAML, JSON or
//! TOML:
//!
//! ```yaml
//! columns:
//!   - { name: long_value, type: double }
//!   - { path: "$.json_value.key1", type: string }
//! stop_on_invalid_record: false
//! default_timezone: UTC
//! ```

use crate::cast::{TimestampCodec, Zone, DEFAULT_DATE, DEFAULT_TIMESTAMP_FORMAT};
use crate::error::ConfigError;
use crate::jsonpath::{self, CompiledPath, JSONPathError};
use crate::value::Kind;
use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level filter configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypecastConfig {
    /// Column and path rules, applied in declaration order
    pub columns: Vec<ColumnRule>,

    /// Abort on the first failed cast or missing path instead of nulling
    pub stop_on_invalid_record: bool,

    /// Timezone used by timestamp rules that do not set one
    pub default_timezone: String,

    /// Pattern used by timestamp rules that do not set one
    pub default_timestamp_format: String,

    /// Date used when a pattern carries only a time of day
    pub default_date: String,
}

impl Default for TypecastConfig {
    fn default() -> Self {
        Self {
            columns: Vec::new(),
            stop_on_invalid_record: false,
            default_timezone: "UTC".to_string(),
            default_timestamp_format: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            default_date: DEFAULT_DATE.to_string(),
        }
    }
}

/// One retyping rule: a whole column or a path inside a JSON column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRule {
    /// Column name; a name starting with `$` is read as a path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(rename = "type")]
    pub kind: Kind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    /// Sub-document of the column value to select before casting
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_path: Option<String>,
}

/// What a rule applies to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastTarget {
    Column(String),
    Path(CompiledPath),
}

impl ColumnRule {
    pub fn column(name: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: Some(name.into()),
            path: None,
            kind,
            timezone: None,
            format: None,
            date: None,
            json_path: None,
        }
    }

    pub fn path(path: impl Into<String>, kind: Kind) -> Self {
        Self {
            name: None,
            path: Some(path.into()),
            ..Self::column(String::new(), kind)
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = Some(timezone.into());
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = Some(date.into());
        self
    }

    pub fn with_json_path(mut self, json_path: impl Into<String>) -> Self {
        self.json_path = Some(json_path.into());
        self
    }

    /// Resolve the rule's target, compiling it when it is a path
    pub fn target(&self) -> Result<CastTarget, ConfigError> {
        let text = match (self.name.as_deref(), self.path.as_deref()) {
            (Some(name), Some(path)) => {
                return Err(ConfigError::ConflictingTarget {
                    name: name.to_string(),
                    path: path.to_string(),
                })
            }
            (None, None) => return Err(ConfigError::MissingTarget),
            (Some(name), None) if !jsonpath::is_probably_json_path(name) => {
                return Ok(CastTarget::Column(name.to_string()))
            }
            (Some(text), None) | (None, Some(text)) => text,
        };

        let path = jsonpath::compile(text.trim())?;
        if path.column_name().is_none() {
            return Err(JSONPathError::invalid_path(
                "path must start with a column name",
                text,
                Some("write the column as the first property, e.g. $.column.key".to_string()),
            )
            .into());
        }
        Ok(CastTarget::Path(path))
    }

    /// Compiled `json_path`, if any
    pub fn selector(&self) -> Result<Option<CompiledPath>, ConfigError> {
        self.json_path
            .as_deref()
            .map(|text| jsonpath::compile(text.trim()).map_err(ConfigError::from))
            .transpose()
    }

    /// Timestamp codec for this rule, falling back to the configuration defaults
    pub fn codec(&self, config: &TypecastConfig) -> Result<TimestampCodec, ConfigError> {
        build_codec(
            self.format.as_deref().unwrap_or(&config.default_timestamp_format),
            self.timezone.as_deref().unwrap_or(&config.default_timezone),
            self.date.as_deref().unwrap_or(&config.default_date),
        )
    }
}

impl TypecastConfig {
    pub fn new(columns: Vec<ColumnRule>) -> Self {
        Self {
            columns,
            ..Self::default()
        }
    }

    pub fn with_stop_on_invalid_record(mut self, stop: bool) -> Self {
        self.stop_on_invalid_record = stop;
        self
    }

    /// Codec built from the defaults alone
    pub fn default_codec(&self) -> Result<TimestampCodec, ConfigError> {
        build_codec(
            &self.default_timestamp_format,
            &self.default_timezone,
            &self.default_date,
        )
    }

    /// Load a configuration file, choosing the decoder by extension
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        format.decode(&text)
    }

    pub fn from_str_as(text: &str, format: ConfigFormat) -> Result<Self, ConfigError> {
        format.decode(text)
    }
}

/// Zone text to [`Zone`]
pub fn parse_zone(name: &str) -> Result<Zone, ConfigError> {
    Zone::parse(name).ok_or_else(|| ConfigError::InvalidTimezone {
        name: name.to_string(),
    })
}

/// `YYYY-MM-DD` to a date
pub fn parse_date(value: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| ConfigError::InvalidDate {
        value: value.to_string(),
    })
}

fn build_codec(pattern: &str, zone: &str, date: &str) -> Result<TimestampCodec, ConfigError> {
    TimestampCodec::new(pattern, parse_zone(zone)?, parse_date(date)?)
}

/// Serialization format of a configuration file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Yaml,
    Json,
    Toml,
}

impl ConfigFormat {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|s| s.to_str()) {
            Some("yaml") | Some("yml") => Ok(ConfigFormat::Yaml),
            Some("json") => Ok(ConfigFormat::Json),
            Some("toml") => Ok(ConfigFormat::Toml),
            _ => Err(ConfigError::UnknownFormat {
                path: PathBuf::from(path),
            }),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ConfigFormat::Yaml => "YAML",
            ConfigFormat::Json => "JSON",
            ConfigFormat::Toml => "TOML",
        }
    }

    /// Decode any deserializable document in this format
    pub fn decode<T: DeserializeOwned>(self, text: &str) -> Result<T, ConfigError> {
        let decoded: anyhow::Result<T> = match self {
            ConfigFormat::Yaml => serde_yaml::from_str(text).map_err(Into::into),
            ConfigFormat::Json => serde_json::from_str(text).map_err(Into::into),
            ConfigFormat::Toml => toml::from_str(text).map_err(Into::into),
        };
        decoded.map_err(|source| ConfigError::Decode {
            format: self.name(),
            source,
        })
    }
}
