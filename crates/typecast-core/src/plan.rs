//! Plan construction
//!
//! A [`TypecastPlan`] is the validated form of a [`TypecastConfig`] against an
//! input [`Schema`]: one [`ColumnSpec`] per input column, the path-type index
//! shared by every JSON column, and the output schema. Every configuration
//! problem is reported here, before any record is processed.

use crate::cast::TimestampCodec;
use crate::config::{CastTarget, ColumnRule, TypecastConfig};
use crate::error::ConfigError;
use crate::jsonpath::{CompiledPath, JSONPathError, PathToken, PathTypeIndex};
use crate::schema::{Column, Schema};
use crate::value::Kind;
use std::collections::HashMap;
use tracing::debug;

/// Immutable per-column processing instructions
#[derive(Debug, Clone)]
pub struct ColumnSpec {
    /// The input column
    pub column: Column,
    /// Column-wide target kind, applied last
    pub target: Option<Kind>,
    /// Sub-document selected before the column-wide cast
    pub json_path: Option<CompiledPath>,
    /// Set when path rules are rooted at this column
    pub visit_root: Option<CompiledPath>,
    /// Concrete leaves under this column that must match a node
    pub required_leaves: Vec<CompiledPath>,
    pub codec: TimestampCodec,
}

impl ColumnSpec {
    pub fn output_kind(&self) -> Kind {
        self.target.unwrap_or(self.column.kind)
    }

    /// Whether the value must be handled as a JSON document
    pub fn needs_document(&self) -> bool {
        self.visit_root.is_some() || self.json_path.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct TypecastPlan {
    columns: Vec<ColumnSpec>,
    index: PathTypeIndex,
    input_schema: Schema,
    output_schema: Schema,
    stop_on_invalid_record: bool,
}

struct ColumnRuleSpec {
    kind: Kind,
    json_path: Option<CompiledPath>,
    codec: TimestampCodec,
}

impl TypecastPlan {
    pub fn build(config: &TypecastConfig, input: &Schema) -> Result<Self, ConfigError> {
        let default_codec = config.default_codec()?;
        let mut column_rules: HashMap<String, ColumnRuleSpec> = HashMap::new();
        let mut path_rules: Vec<(CompiledPath, Kind)> = Vec::new();

        for rule in &config.columns {
            match rule.target()? {
                CastTarget::Column(name) => {
                    let spec = column_rule(rule, config, input, &name)?;
                    if column_rules.insert(name.clone(), spec).is_some() {
                        return Err(ConfigError::DuplicateRule { target: name });
                    }
                }
                CastTarget::Path(path) => {
                    path_rule(rule, input, &path)?;
                    if path_rules.iter().any(|(seen, _)| *seen == path) {
                        return Err(ConfigError::DuplicateRule {
                            target: path.to_string(),
                        });
                    }
                    path_rules.push((path, rule.kind));
                }
            }
        }

        for (path, _) in &path_rules {
            check_json_column(path, input, &column_rules)?;
        }
        check_nesting(&path_rules)?;

        let index = PathTypeIndex::build(path_rules);
        let mut columns = Vec::with_capacity(input.len());
        for column in input {
            let rule = column_rules.remove(&column.name);
            let rooted = index.leaves_under(&column.name).next().is_some();
            let mut required_leaves: Vec<CompiledPath> = index
                .leaves_under(&column.name)
                .filter(|leaf| !leaf.has_wildcard())
                .cloned()
                .collect();
            required_leaves.sort_by_key(|leaf| leaf.to_string());

            let (target, json_path, codec) = match rule {
                Some(rule) => (Some(rule.kind), rule.json_path, rule.codec),
                None => (None, None, default_codec.clone()),
            };

            let spec = ColumnSpec {
                column: column.clone(),
                target,
                json_path,
                visit_root: rooted.then(|| CompiledPath::for_column(column.name.clone())),
                required_leaves,
                codec,
            };
            debug!(
                column = %spec.column.name,
                input = %spec.column.kind,
                output = %spec.output_kind(),
                paths = spec.visit_root.is_some(),
                "planned column"
            );
            columns.push(spec);
        }

        let output_schema = Schema::new(columns.iter().map(|spec| (spec.column.name.clone(), spec.output_kind())))?;
        debug!(
            columns = columns.len(),
            paths = index.len(),
            stop_on_invalid_record = config.stop_on_invalid_record,
            "built typecast plan"
        );

        Ok(Self {
            columns,
            index,
            input_schema: input.clone(),
            output_schema,
            stop_on_invalid_record: config.stop_on_invalid_record,
        })
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn index(&self) -> &PathTypeIndex {
        &self.index
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &Schema {
        &self.output_schema
    }

    pub fn stop_on_invalid_record(&self) -> bool {
        self.stop_on_invalid_record
    }
}

fn column_rule(
    rule: &ColumnRule,
    config: &TypecastConfig,
    input: &Schema,
    name: &str,
) -> Result<ColumnRuleSpec, ConfigError> {
    let column = input.lookup(name).ok_or_else(|| ConfigError::UnknownColumn {
        name: name.to_string(),
    })?;
    let json_path = rule.selector()?;
    if let Some(selector) = json_path.as_ref().filter(|p| p.has_wildcard()) {
        return Err(JSONPathError::invalid_path(
            "json_path must select a single node",
            selector.to_string(),
            Some("replace [*] with a concrete index".to_string()),
        )
        .into());
    }
    if json_path.is_some() && !matches!(column.kind, Kind::Json | Kind::Str) {
        return Err(ConfigError::JsonPathOnScalar {
            column: name.to_string(),
            kind: column.kind,
        });
    }
    Ok(ColumnRuleSpec {
        kind: rule.kind,
        json_path,
        codec: rule.codec(config)?,
    })
}

fn path_rule(rule: &ColumnRule, input: &Schema, path: &CompiledPath) -> Result<(), ConfigError> {
    if let Some(selector) = &rule.json_path {
        return Err(JSONPathError::invalid_path(
            "json_path applies to column rules only",
            selector.as_str(),
            Some(format!("fold it into the path: {}", path)),
        )
        .into());
    }
    if rule.kind == Kind::Time {
        return Err(ConfigError::UnsupportedPathType {
            path: path.to_string(),
            kind: rule.kind,
        });
    }
    let column = path.column_name().unwrap_or_default();
    if input.lookup(column).is_none() {
        return Err(ConfigError::UnknownColumn {
            name: column.to_string(),
        });
    }
    Ok(())
}

/// Paths apply to json columns, or to string columns cast to json as a whole
fn check_json_column(
    path: &CompiledPath,
    input: &Schema,
    column_rules: &HashMap<String, ColumnRuleSpec>,
) -> Result<(), ConfigError> {
    let name = path.column_name().unwrap_or_default();
    let Some(column) = input.lookup(name) else {
        return Err(ConfigError::UnknownColumn { name: name.to_string() });
    };
    let parsed_to_json = column_rules
        .get(name)
        .map(|rule| rule.kind == Kind::Json && rule.json_path.is_none())
        .unwrap_or(false);

    match column.kind {
        Kind::Json => Ok(()),
        Kind::Str if parsed_to_json => Ok(()),
        kind => Err(ConfigError::NotJsonColumn {
            path: path.to_string(),
            column: name.to_string(),
            kind,
        }),
    }
}

/// A leaf may not sit below another leaf, directly or through a wildcard
fn check_nesting(path_rules: &[(CompiledPath, Kind)]) -> Result<(), ConfigError> {
    for (inner, _) in path_rules {
        for prefix in inner.prefixes() {
            if let Some((outer, _)) = path_rules.iter().find(|(outer, _)| covers(outer, &prefix)) {
                return Err(ConfigError::OverlappingPaths {
                    outer: outer.to_string(),
                    inner: inner.to_string(),
                });
            }
        }
    }
    Ok(())
}

/// Whether every node `path` addresses is also addressed by `outer`
fn covers(outer: &CompiledPath, path: &CompiledPath) -> bool {
    outer.len() == path.len()
        && outer
            .tokens()
            .iter()
            .zip(path.tokens())
            .all(|pair| match pair {
                (PathToken::Wildcard, PathToken::Index(_) | PathToken::Wildcard) => true,
                (a, b) => a == b,
            })
}
