//! Column dispatcher
//!
//! Applies a [`TypecastPlan`] to records. Each column is processed on its own:
//! null stays null, JSON-valued columns go through the visitor first, and the
//! column-wide cast runs last. The failure policy decides whether a failed
//! column is nulled with a warning or aborts the record.

use crate::cast::{self, CastError};
use crate::error::{Error, Result};
use crate::jsonpath::{self, CompiledPath, JsonVisitor};
use crate::plan::{ColumnSpec, TypecastPlan};
use crate::value::{JsonNode, Kind, Value};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::warn;

/// A record: one optional value per input column, `None` being null
pub type Record = Vec<Option<Value>>;

/// Counters since the dispatcher was created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    pub records: u64,
    pub nulled_columns: u64,
    pub missing_paths: u64,
}

#[derive(Debug)]
pub struct ColumnDispatcher {
    plan: TypecastPlan,
    records: AtomicU64,
    nulled_columns: AtomicU64,
    missing_paths: AtomicU64,
}

impl ColumnDispatcher {
    pub fn new(plan: TypecastPlan) -> Self {
        Self {
            plan,
            records: AtomicU64::new(0),
            nulled_columns: AtomicU64::new(0),
            missing_paths: AtomicU64::new(0),
        }
    }

    pub fn plan(&self) -> &TypecastPlan {
        &self.plan
    }

    /// Process a borrowed record
    pub fn process(&self, record: &[Option<Value>]) -> Result<Record> {
        self.process_owned(record.to_vec())
    }

    /// Process a record, moving its values through where possible
    pub fn process_owned(&self, record: Record) -> Result<Record> {
        let expected = self.plan.columns().len();
        if record.len() != expected {
            return Err(Error::RecordShape {
                expected,
                found: record.len(),
            });
        }

        let out = self
            .plan
            .columns()
            .iter()
            .zip(record)
            .map(|(spec, value)| self.process_column(spec, value))
            .collect::<Result<Record>>()?;
        self.records.fetch_add(1, Ordering::Relaxed);
        Ok(out)
    }

    /// Process records in order, stopping at the first error
    pub fn process_batch<I>(&self, records: I) -> Result<Vec<Record>>
    where
        I: IntoIterator<Item = Record>,
    {
        records
            .into_iter()
            .map(|record| self.process_owned(record))
            .collect()
    }

    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            records: self.records.load(Ordering::Relaxed),
            nulled_columns: self.nulled_columns.load(Ordering::Relaxed),
            missing_paths: self.missing_paths.load(Ordering::Relaxed),
        }
    }

    fn process_column(&self, spec: &ColumnSpec, value: Option<Value>) -> Result<Option<Value>> {
        let Some(value) = value else {
            return Ok(None);
        };

        match self.convert(spec, value) {
            Ok(value) => Ok(Some(value)),
            Err(err) if self.plan.stop_on_invalid_record() => Err(err),
            Err(err) => {
                if matches!(err, Error::PathNotFound { .. }) {
                    self.missing_paths.fetch_add(1, Ordering::Relaxed);
                }
                self.nulled_columns.fetch_add(1, Ordering::Relaxed);
                warn!(column = %spec.column.name, error = %err, "setting column to null");
                Ok(None)
            }
        }
    }

    fn convert(&self, spec: &ColumnSpec, value: Value) -> Result<Value> {
        let column = &spec.column.name;
        let cast_failed = |source: CastError| Error::Cast {
            column: column.clone(),
            source,
        };

        let value = if spec.needs_document() {
            let mut doc = into_document(value, spec).map_err(cast_failed)?;
            if let Some(root) = &spec.visit_root {
                doc = self.visit(spec, root, doc)?;
            }
            if let Some(selector) = &spec.json_path {
                doc = jsonpath::select(&doc, selector.tokens())
                    .cloned()
                    .ok_or_else(|| Error::PathNotFound {
                        column: column.clone(),
                        path: selector.to_string(),
                    })?;
            }
            Value::Json(doc)
        } else {
            value
        };

        match spec.target {
            Some(target) => cast::cast(value, target, &spec.codec).map_err(cast_failed),
            None => Ok(value),
        }
    }

    fn visit(&self, spec: &ColumnSpec, root: &CompiledPath, doc: JsonNode) -> Result<JsonNode> {
        let visited = JsonVisitor::new(self.plan.index(), &spec.codec)
            .visit_with_report(root, doc)
            .map_err(|source| Error::Cast {
                column: spec.column.name.clone(),
                source,
            })?;

        for leaf in &spec.required_leaves {
            if visited.matched.contains(leaf) {
                continue;
            }
            if self.plan.stop_on_invalid_record() {
                return Err(Error::PathNotFound {
                    column: spec.column.name.clone(),
                    path: leaf.to_string(),
                });
            }
            self.missing_paths.fetch_add(1, Ordering::Relaxed);
            warn!(column = %spec.column.name, path = %leaf, "path not found, keeping document");
        }
        Ok(visited.value)
    }
}

/// The column value as a document: json stays, strings are parsed
fn into_document(value: Value, spec: &ColumnSpec) -> std::result::Result<JsonNode, CastError> {
    match value {
        Value::Json(node) => Ok(node),
        other => match cast::cast(other, Kind::Json, &spec.codec)? {
            Value::Json(node) => Ok(node),
            other => Err(CastError::unsupported(other.kind(), Kind::Json, other)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnRule, TypecastConfig};
    use crate::schema::Schema;
    use serde_json::json;
    use std::sync::Arc;
    use std::thread;

    fn dispatcher(columns: &[(&str, Kind)], rules: Vec<ColumnRule>, stop: bool) -> ColumnDispatcher {
        let schema = Schema::new(columns.iter().map(|(n, k)| (n.to_string(), *k))).unwrap();
        let config = TypecastConfig::new(rules).with_stop_on_invalid_record(stop);
        ColumnDispatcher::new(TypecastPlan::build(&config, &schema).unwrap())
    }

    #[test]
    fn test_null_stays_null() {
        let d = dispatcher(&[("a", Kind::Str)], vec![ColumnRule::column("a", Kind::Int)], true);
        assert_eq!(d.process(&[None]).unwrap(), vec![None]);
    }

    #[test]
    fn test_column_cast_and_passthrough() {
        let d = dispatcher(
            &[("a", Kind::Str), ("b", Kind::Int)],
            vec![ColumnRule::column("a", Kind::Int)],
            false,
        );
        let out = d.process(&[Some("42".into()), Some(Value::Int(7))]).unwrap();
        assert_eq!(out, vec![Some(Value::Int(42)), Some(Value::Int(7))]);
    }

    #[test]
    fn test_lenient_cast_failure_nulls_column() {
        let d = dispatcher(
            &[("flag", Kind::Str), ("n", Kind::Str)],
            vec![
                ColumnRule::column("flag", Kind::Bool),
                ColumnRule::column("n", Kind::Int),
            ],
            false,
        );
        let out = d.process(&[Some("foo".into()), Some("5".into())]).unwrap();
        assert_eq!(out, vec![None, Some(Value::Int(5))]);
        assert_eq!(d.stats().nulled_columns, 1);
        assert_eq!(d.stats().records, 1);
    }

    #[test]
    fn test_strict_cast_failure_aborts() {
        let d = dispatcher(&[("flag", Kind::Str)], vec![ColumnRule::column("flag", Kind::Bool)], true);
        let err = d.process(&[Some("foo".into())]).unwrap_err();
        assert!(matches!(err, Error::Cast { ref column, .. } if column == "flag"));
        assert_eq!(d.stats().records, 0);
    }

    #[test]
    fn test_missing_path_lenient_keeps_document() {
        let d = dispatcher(
            &[("j", Kind::Json)],
            vec![
                ColumnRule::path("$.j.key1", Kind::Str),
                ColumnRule::path("$.j.no_key", Kind::Str),
            ],
            false,
        );
        let out = d.process(&[Some(json!({"key1": 1, "k": 2}).into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Json(json!({"key1": "1", "k": 2})))]);
        let stats = d.stats();
        assert_eq!(stats.missing_paths, 1);
        assert_eq!(stats.nulled_columns, 0);
    }

    #[test]
    fn test_missing_path_strict_aborts() {
        let d = dispatcher(&[("j", Kind::Json)], vec![ColumnRule::path("$.j.no_key", Kind::Str)], true);
        let err = d.process(&[Some(json!({"k": 1}).into())]).unwrap_err();
        assert!(matches!(err, Error::PathNotFound { ref path, .. } if path == "$.j.no_key"));
    }

    #[test]
    fn test_aliased_leaves_are_not_missing() {
        let d = dispatcher(
            &[("j", Kind::Json)],
            vec![
                ColumnRule::path("$.j.a[0]", Kind::Str),
                ColumnRule::path("$.j.a[-1]", Kind::Str),
            ],
            true,
        );
        let out = d.process(&[Some(json!({"a": [1]}).into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Json(json!({"a": ["1"]})))]);
        assert_eq!(d.stats().missing_paths, 0);
    }

    #[test]
    fn test_wildcard_over_empty_array_is_satisfied() {
        let d = dispatcher(&[("j", Kind::Json)], vec![ColumnRule::path("$.j.a[*].b", Kind::Str)], true);
        let out = d.process(&[Some(json!({"a": []}).into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Json(json!({"a": []})))]);
    }

    #[test]
    fn test_string_column_parsed_then_visited() {
        let d = dispatcher(
            &[("raw", Kind::Str)],
            vec![
                ColumnRule::column("raw", Kind::Json),
                ColumnRule::path("$.raw.n", Kind::Str),
            ],
            true,
        );
        let out = d.process(&[Some(r#"{"n": 5, "m": 6}"#.into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Json(json!({"n": "5", "m": 6})))]);

        let err = d.process(&[Some("{not json".into())]).unwrap_err();
        assert!(matches!(err, Error::Cast { .. }));
    }

    #[test]
    fn test_visit_then_column_cast() {
        let d = dispatcher(
            &[("j", Kind::Json)],
            vec![
                ColumnRule::path("$.j.n", Kind::Str),
                ColumnRule::column("j", Kind::Str),
            ],
            true,
        );
        let out = d.process(&[Some(json!({"n": 1}).into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Str(r#"{"n":"1"}"#.to_string()))]);
    }

    #[test]
    fn test_json_path_selection() {
        let d = dispatcher(
            &[("payload", Kind::Json)],
            vec![ColumnRule::column("payload", Kind::Int).with_json_path("$.count")],
            false,
        );
        let out = d.process(&[Some(json!({"count": "42"}).into())]).unwrap();
        assert_eq!(out, vec![Some(Value::Int(42))]);

        let out = d.process(&[Some(json!({"other": 1}).into())]).unwrap();
        assert_eq!(out, vec![None]);
        let stats = d.stats();
        assert_eq!(stats.missing_paths, 1);
        assert_eq!(stats.nulled_columns, 1);
    }

    #[test]
    fn test_record_shape_is_checked() {
        let d = dispatcher(&[("a", Kind::Int)], vec![], false);
        let err = d.process(&[None, None]).unwrap_err();
        assert!(matches!(err, Error::RecordShape { expected: 1, found: 2 }));
    }

    #[test]
    fn test_batch_stops_at_first_error() {
        let d = dispatcher(&[("n", Kind::Str)], vec![ColumnRule::column("n", Kind::Int)], true);
        let ok = d
            .process_batch(vec![vec![Some("1".into())], vec![Some("2".into())]])
            .unwrap();
        assert_eq!(ok, vec![vec![Some(Value::Int(1))], vec![Some(Value::Int(2))]]);

        let err = d.process_batch(vec![vec![Some("1".into())], vec![Some("x".into())], vec![Some("3".into())]]);
        assert!(err.is_err());
        assert_eq!(d.stats().records, 3);
    }

    #[test]
    fn test_shared_across_threads() {
        let d = Arc::new(dispatcher(
            &[("j", Kind::Json)],
            vec![ColumnRule::path("$.j.a[*]", Kind::Str)],
            false,
        ));

        let handles: Vec<_> = (0..4)
            .map(|i| {
                let d = Arc::clone(&d);
                thread::spawn(move || {
                    for n in 0..25 {
                        let out = d.process_owned(vec![Some(json!({"a": [i, n]}).into())]).unwrap();
                        assert_eq!(
                            out,
                            vec![Some(Value::Json(json!({"a": [i.to_string(), n.to_string()]})))]
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(d.stats().records, 100);
    }
}
