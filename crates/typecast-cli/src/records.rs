//! JSON Lines record codec
//!
//! Each input line is one JSON object keyed by column name. Values are read
//! against the declared input kind: scalars must already have that kind
//! (a long is accepted for a double column), timestamps are read from text
//! with the column's pattern or from epoch seconds, and json columns take
//! the node as it is. A missing key and `null` both read as a null column.
//!
//! Output lines carry the output schema's columns in order. Timestamps are
//! rendered as text with the codec of the rule that produced them, or with
//! the input column's codec when no rule applies. A value JSON cannot hold
//! (a non-finite double) is nulled with a warning unless the job stops on
//! invalid records.

use crate::config::JobConfig;
use crate::error::{Error, Result};
use serde_json::Map;
use typecast_core::cast::json::into_scalar;
use tracing::warn;
use typecast_core::{cast, CastError, JsonNode, Kind, Record, TimestampCodec, TypecastPlan, Value};

struct InputField {
    name: String,
    kind: Kind,
    codec: TimestampCodec,
}

struct OutputField {
    name: String,
    codec: TimestampCodec,
}

/// One rendered output line
#[derive(Debug)]
pub struct Encoded {
    pub line: String,
    /// Columns written as null because their value could not be rendered
    pub nulled_columns: u64,
}

/// Converts between JSON Lines and dispatcher records
pub struct RecordCodec {
    inputs: Vec<InputField>,
    outputs: Vec<OutputField>,
    stop_on_invalid_record: bool,
}

impl RecordCodec {
    pub fn new(job: &JobConfig, plan: &TypecastPlan) -> Result<Self> {
        let inputs = job
            .input_schema
            .iter()
            .map(|column| -> Result<InputField> {
                Ok(InputField {
                    name: column.name.clone(),
                    kind: column.kind,
                    codec: column.codec(&job.filter)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let outputs = plan
            .columns()
            .iter()
            .zip(&inputs)
            .map(|(spec, input)| OutputField {
                name: spec.column.name.clone(),
                codec: match spec.target {
                    Some(_) => spec.codec.clone(),
                    None => input.codec.clone(),
                },
            })
            .collect();

        Ok(Self {
            inputs,
            outputs,
            stop_on_invalid_record: plan.stop_on_invalid_record(),
        })
    }

    /// Read one line; `line` is 1-based and only used in errors
    pub fn decode(&self, line: usize, text: &str) -> Result<Record> {
        let node: JsonNode = serde_json::from_str(text)
            .map_err(|e| Error::invalid_record(line, format!("not valid JSON: {}", e)))?;
        let JsonNode::Object(mut object) = node else {
            return Err(Error::invalid_record(line, "expected a JSON object"));
        };

        self.inputs
            .iter()
            .map(|field| match object.remove(&field.name) {
                None | Some(JsonNode::Null) => Ok(None),
                Some(node) => read_field(field, node)
                    .map(Some)
                    .map_err(|message| Error::invalid_record(line, format!("column '{}': {}", field.name, message))),
            })
            .collect()
    }

    /// Render one processed record as a compact JSON object
    pub fn encode(&self, record: Record) -> Result<Encoded> {
        let mut object = Map::with_capacity(self.outputs.len());
        let mut nulled_columns = 0;
        for (field, value) in self.outputs.iter().zip(record) {
            let node = match value.map(|value| write_field(field, value)) {
                None => JsonNode::Null,
                Some(Ok(node)) => node,
                Some(Err(source)) if self.stop_on_invalid_record => {
                    return Err(typecast_core::Error::Cast {
                        column: field.name.clone(),
                        source,
                    }
                    .into());
                }
                Some(Err(source)) => {
                    warn!(column = %field.name, error = %source, "setting column to null");
                    nulled_columns += 1;
                    JsonNode::Null
                }
            };
            object.insert(field.name.clone(), node);
        }
        Ok(Encoded {
            line: serde_json::to_string(&JsonNode::Object(object))?,
            nulled_columns,
        })
    }
}

fn read_field(field: &InputField, node: JsonNode) -> std::result::Result<Value, String> {
    if field.kind == Kind::Json {
        return Ok(Value::Json(node));
    }

    let value = into_scalar(node).map_err(|doc| format!("expected {}, found a JSON document {}", field.kind, doc))?;
    match (value, field.kind) {
        (value, kind) if value.kind() == kind => Ok(value),
        (Value::Int(i), Kind::Float) => Ok(Value::Float(i as f64)),
        (Value::Str(s), Kind::Time) => field.codec.parse(&s).map(Value::Time).map_err(|e| e.to_string()),
        (value @ (Value::Int(_) | Value::Float(_)), Kind::Time) => {
            cast(value, Kind::Time, &field.codec).map_err(|e| e.to_string())
        }
        (value, kind) => Err(format!("expected {}, found {}", kind, value.kind())),
    }
}

fn write_field(field: &OutputField, value: Value) -> std::result::Result<JsonNode, CastError> {
    match value {
        Value::Time(ts) => field.codec.format(&ts).map(JsonNode::String),
        other => typecast_core::cast::json::into_node(other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use typecast_core::ConfigFormat;

    const JOB: &str = r#"
input_schema:
  - { name: id, type: string }
  - { name: price, type: double }
  - { name: created, type: timestamp, format: "%Y-%m-%d %H:%M:%S", timezone: "+09:00" }
  - { name: doc, type: json }
columns:
  - { name: id, type: long }
  - { name: created, type: string, format: "%Y-%m-%d" }
  - { path: "$.doc.n", type: long }
"#;

    fn codec() -> RecordCodec {
        let job: JobConfig = ConfigFormat::Yaml.decode(JOB).unwrap();
        let plan = TypecastPlan::build(&job.filter, &job.schema().unwrap()).unwrap();
        RecordCodec::new(&job, &plan).unwrap()
    }

    #[test]
    fn test_decode_by_input_schema() {
        let record = codec()
            .decode(1, r#"{"id": "7", "price": 3, "created": "2023-08-24 20:23:01", "doc": {"n": "5"}}"#)
            .unwrap();
        assert_eq!(record[0], Some(Value::Str("7".to_string())));
        assert_eq!(record[1], Some(Value::Float(3.0)));
        let created = record[2].as_ref().and_then(Value::as_timestamp).unwrap();
        assert_eq!(created.epoch_second(), 1692876181);
        assert_eq!(record[3], Some(Value::Json(serde_json::json!({"n": "5"}))));
    }

    #[test]
    fn test_missing_and_null_read_as_null() {
        let record = codec().decode(1, r#"{"id": null}"#).unwrap();
        assert_eq!(record, vec![None, None, None, None]);
    }

    #[test]
    fn test_epoch_seconds_for_timestamp_column() {
        let record = codec().decode(1, r#"{"created": 1692876181}"#).unwrap();
        let created = record[2].as_ref().and_then(Value::as_timestamp).unwrap();
        assert_eq!(created.epoch_second(), 1692876181);
    }

    #[test]
    fn test_kind_mismatch_is_reported_with_line() {
        let err = codec().decode(4, r#"{"id": 7}"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid record on line 4: column 'id': expected string, found long"
        );
    }

    #[test]
    fn test_non_object_line() {
        assert!(matches!(
            codec().decode(2, "[1, 2]"),
            Err(Error::InvalidRecord { line: 2, .. })
        ));
        assert!(matches!(
            codec().decode(3, "{not json"),
            Err(Error::InvalidRecord { line: 3, .. })
        ));
    }

    #[test]
    fn test_encode_in_output_order() {
        let codec = codec();
        let record = vec![
            Some(Value::Int(7)),
            None,
            Some(Value::Str("2023-08-24".to_string())),
            Some(Value::Json(serde_json::json!({"n": 5}))),
        ];
        assert_eq!(
            codec.encode(record).unwrap().line,
            r#"{"id":7,"price":null,"created":"2023-08-24","doc":{"n":5}}"#
        );
    }

    #[test]
    fn test_encode_timestamp_with_rule_codec() {
        let job: JobConfig = ConfigFormat::Yaml
            .decode(
                r#"
input_schema:
  - { name: ts, type: long }
columns:
  - { name: ts, type: timestamp, format: "%Y-%m-%d %H:%M:%S", timezone: "Asia/Tokyo" }
"#,
            )
            .unwrap();
        let plan = TypecastPlan::build(&job.filter, &job.schema().unwrap()).unwrap();
        let codec = RecordCodec::new(&job, &plan).unwrap();

        let ts = typecast_core::Timestamp::from_epoch(1692876181, 0).unwrap();
        assert_eq!(
            codec.encode(vec![Some(Value::Time(ts))]).unwrap().line,
            r#"{"ts":"2023-08-24 20:23:01"}"#
        );
    }

    fn single_double_column(stop: bool) -> RecordCodec {
        let text = format!(
            "input_schema:\n  - {{ name: x, type: double }}\nstop_on_invalid_record: {}\n",
            stop
        );
        let job: JobConfig = ConfigFormat::Yaml.decode(&text).unwrap();
        let plan = TypecastPlan::build(&job.filter, &job.schema().unwrap()).unwrap();
        RecordCodec::new(&job, &plan).unwrap()
    }

    #[test]
    fn test_non_finite_double_is_nulled_when_lenient() {
        let encoded = single_double_column(false)
            .encode(vec![Some(Value::Float(f64::NAN))])
            .unwrap();
        assert_eq!(encoded.line, r#"{"x":null}"#);
        assert_eq!(encoded.nulled_columns, 1);
    }

    #[test]
    fn test_non_finite_double_fails_when_strict() {
        let err = single_double_column(true)
            .encode(vec![Some(Value::Float(f64::INFINITY))])
            .unwrap_err();
        assert!(matches!(err, Error::Core(typecast_core::Error::Cast { ref column, .. }) if column == "x"));
    }

    #[test]
    fn test_unruled_timestamp_keeps_input_format() {
        let job: JobConfig = ConfigFormat::Yaml
            .decode(
                r#"
input_schema:
  - { name: created, type: timestamp, format: "%Y/%m/%d %H:%M", timezone: "+09:00" }
"#,
            )
            .unwrap();
        let plan = TypecastPlan::build(&job.filter, &job.schema().unwrap()).unwrap();
        let codec = RecordCodec::new(&job, &plan).unwrap();

        let ts = typecast_core::Timestamp::from_epoch(1692876181, 0).unwrap();
        assert_eq!(
            codec.encode(vec![Some(Value::Time(ts))]).unwrap().line,
            r#"{"created":"2023/08/24 20:23"}"#
        );
    }
}
