//! Job files
//!
//! A job file is the filter configuration plus the schema of the records
//! being read:
//!
//! ```yaml
//! input_schema:
//!   - { name: id, type: string }
//!   - { name: created, type: timestamp, format: "%Y-%m-%d %H:%M:%S" }
//!   - { name: payload, type: json }
//! columns:
//!   - { name: id, type: long }
//!   - { path: "$.payload.price", type: double }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use typecast_core::{ColumnRule, ConfigError, ConfigFormat, Kind, Schema, TimestampCodec, TypecastConfig};

/// Filter configuration and input schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobConfig {
    #[serde(flatten)]
    pub filter: TypecastConfig,

    pub input_schema: Vec<InputColumn>,
}

/// One column of the input records
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputColumn {
    pub name: String,

    #[serde(rename = "type")]
    pub kind: Kind,

    /// Pattern for reading timestamp strings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

impl JobConfig {
    /// Load a job file, choosing the decoder by extension
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)?;
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        format.decode(&text)
    }

    pub fn schema(&self) -> Result<Schema, ConfigError> {
        Schema::new(self.input_schema.iter().map(|c| (c.name.clone(), c.kind)))
    }
}

impl InputColumn {
    /// Codec for reading this column, with the job's timestamp defaults
    pub fn codec(&self, filter: &TypecastConfig) -> Result<TimestampCodec, ConfigError> {
        let mut rule = ColumnRule::column(self.name.clone(), self.kind);
        rule.format = self.format.clone();
        rule.timezone = self.timezone.clone();
        rule.codec(filter)
    }
}
