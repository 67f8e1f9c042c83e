//! End-to-end tests for casting nodes inside JSON columns


use serde_json::json;
use test_support::{dispatcher, dispatcher_from_yaml};
use typecast_core::jsonpath::column_name;
use typecast_core::{ColumnRule, Error, Kind, Value};

#[test]
fn test_cast_keys_in_json_column() {
    let d = dispatcher_from_yaml(
        &[("json_value", Kind::Json)],
        r#"
columns:
  - { name: "$.json_value.key1", type: string }
  - { name: "$.json_value.key2", type: boolean }
"#,
    );
    let out = d
        .process(&[Some(json!({"key1": 9999, "key2": "true"}).into())])
        .unwrap();
    assert_eq!(out, vec![Some(Value::Json(json!({"key1": "9999", "key2": true})))]);
}

#[test]
fn test_missing_key_is_skipped_when_lenient() {
    let d = dispatcher(
        &[("json_value", Kind::Json)],
        vec![ColumnRule::path("$.json_value.no_key", Kind::Str)],
        false,
    );
    let doc = json!({"key1": 9999});
    let out = d.process(&[Some(doc.clone().into())]).unwrap();
    assert_eq!(out, vec![Some(Value::Json(doc))]);
    assert_eq!(d.stats().missing_paths, 1);
}

#[test]
fn test_missing_key_aborts_when_strict() {
    let d = dispatcher(
        &[("json_value", Kind::Json)],
        vec![ColumnRule::path("$.json_value.no_key", Kind::Str)],
        true,
    );
    let err = d.process(&[Some(json!({"key1": 9999}).into())]).unwrap_err();
    match err {
        Error::PathNotFound { column, path } => {
            assert_eq!(column, "json_value");
            assert_eq!(path, "$.json_value.no_key");
        }
        other => panic!("expected path-not-found, got {}", other),
    }
}

#[test]
fn test_complex_json_with_array_index() {
    let d = dispatcher_from_yaml(
        &[("complex_json", Kind::Json)],
        r#"
columns:
  - { path: "$.complex_json.a[0].b", type: string }
  - { path: "$.complex_json.a[0].c", type: double }
"#,
    );
    let out = d
        .process(&[Some(json!({"a": [{"b": "123", "c": 456}]}).into())])
        .unwrap();
    let Some(Value::Json(doc)) = &out[0] else {
        panic!("expected a json value, got {:?}", out[0]);
    };
    assert_eq!(doc.to_string(), r#"{"a":[{"b":"123","c":456.0}]}"#);
}

#[test]
fn test_pruned_siblings_are_never_cast() {
    // A boolean rule on `c` would fail for 2; only `b` is configured
    let d = dispatcher(
        &[("j", Kind::Json)],
        vec![ColumnRule::path("$.j.a.b", Kind::Str)],
        true,
    );
    let out = d.process(&[Some(json!({"a": {"b": 1, "c": 2}}).into())]).unwrap();
    assert_eq!(out, vec![Some(Value::Json(json!({"a": {"b": "1", "c": 2}})))]);
}

#[test]
fn test_wildcard_and_index_rules_together() {
    let d = dispatcher(
        &[("j", Kind::Json)],
        vec![
            ColumnRule::path("$.j.items[*].price", Kind::Float),
            ColumnRule::path("$.j.items[0].sku", Kind::Str),
        ],
        true,
    );
    let out = d
        .process(&[Some(
            json!({"items": [{"sku": 1, "price": "1.5"}, {"sku": 2, "price": 3}]}).into(),
        )])
        .unwrap();
    assert_eq!(
        out,
        vec![Some(Value::Json(json!({
            "items": [{"sku": "1", "price": 1.5}, {"sku": 2, "price": 3.0}]
        })))]
    );
}

#[test]
fn test_leaf_cast_failure_nulls_column_when_lenient() {
    let d = dispatcher(
        &[("j", Kind::Json), ("k", Kind::Int)],
        vec![ColumnRule::path("$.j.flag", Kind::Bool)],
        false,
    );
    let out = d
        .process(&[Some(json!({"flag": "maybe"}).into()), Some(Value::Int(1))])
        .unwrap();
    assert_eq!(out, vec![None, Some(Value::Int(1))]);
}

#[test]
fn test_leaf_cast_failure_reports_path_when_strict() {
    let d = dispatcher(&[("j", Kind::Json)], vec![ColumnRule::path("$.j.flag", Kind::Bool)], true);
    let err = d.process(&[Some(json!({"flag": "maybe"}).into())]).unwrap_err();
    match err {
        Error::Cast { column, source } => {
            assert_eq!(column, "j");
            assert_eq!(source.path.as_deref(), Some("$.j.flag"));
        }
        other => panic!("expected a cast error, got {}", other),
    }
}

#[test]
fn test_string_column_cast_to_json_then_visited() {
    let d = dispatcher_from_yaml(
        &[("raw", Kind::Str)],
        r#"
columns:
  - { name: raw, type: json }
  - { path: "$.raw.n", type: long }
"#,
    );
    let out = d.process(&[Some(r#"{"n": "12", "s": "x"}"#.into())]).unwrap();
    assert_eq!(out, vec![Some(Value::Json(json!({"n": 12, "s": "x"})))]);
}

#[test]
fn test_column_name_of_path() {
    assert_eq!(column_name("$.foo.bar[0].name").unwrap(), "foo");
    assert_eq!(column_name("$['json value'].key").unwrap(), "json value");
}
