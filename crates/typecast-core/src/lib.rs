//! Typecast Core - column and JSON-path retyping for record pipelines
//!
//! This crate converts the columns of dynamically typed records to declared
//! target types, and retypes individual nodes inside JSON columns addressed
//! by a restricted path language.
//!
//! # Main Components
//!
//! - **Cast Matrix**: total conversion table between the six value kinds
//! - **Timestamp Codec**: strftime-style patterns with timezones via `chrono`
//! - **JSON Paths**: compiler, path-type index and recursive visitor
//! - **Plan**: configuration validated against an input schema
//! - **Column Dispatcher**: per-record processing with a failure policy
//!
//! # Example
//!
//! ```
//! use typecast_core::{ColumnDispatcher, ColumnRule, Kind, Schema, TypecastConfig, TypecastPlan, Value};
//! use serde_json::json;
//!
//! fn example() -> typecast_core::Result<()> {
//!     let schema = Schema::new([("id", Kind::Str), ("doc", Kind::Json)])?;
//!     let config = TypecastConfig::new(vec![
//!         ColumnRule::column("id", Kind::Int),
//!         ColumnRule::path("$.doc.key1", Kind::Str),
//!     ]);
//!     let dispatcher = ColumnDispatcher::new(TypecastPlan::build(&config, &schema)?);
//!
//!     let out = dispatcher.process(&[Some("7".into()), Some(json!({"key1": 9999}).into())])?;
//!     assert_eq!(out[0], Some(Value::Int(7)));
//!     assert_eq!(out[1], Some(Value::Json(json!({"key1": "9999"}))));
//!     Ok(())
//! }
//! # example().unwrap();
//! ```

pub mod cast;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod jsonpath;
pub mod plan;
pub mod schema;
pub mod value;

// Re-export main types for convenience
pub use cast::{cast, CastError, TimestampCodec, Zone};
pub use config::{CastTarget, ColumnRule, ConfigFormat, TypecastConfig};
pub use dispatcher::{ColumnDispatcher, Record, StatsSnapshot};
pub use error::{ConfigError, Error, Result};
pub use jsonpath::{compile, CompiledPath, JSONPathError, JsonVisitor, PathToken, PathTypeIndex};
pub use plan::{ColumnSpec, TypecastPlan};
pub use schema::{Column, Schema};
pub use value::{JsonNode, Kind, Timestamp, Value};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
