//! Bridging between JSON nodes and values, and the json row of the matrix
//!
//! Scalar JSON nodes are classified by kind: a number that fits `i64` is a
//! long, any other number is a double.

use super::{scalar, text, CastError, TimestampCodec};
use crate::value::{JsonNode, Kind, Value};
use serde_json::Number;

/// Split a node into a scalar value, or hand back documents (arrays,
/// objects) and null untouched
pub fn into_scalar(node: JsonNode) -> Result<Value, JsonNode> {
    match node {
        JsonNode::Bool(b) => Ok(Value::Bool(b)),
        JsonNode::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Ok(Value::Int(i)),
            (None, Some(f)) => Ok(Value::Float(f)),
            (None, None) => Err(JsonNode::Number(n)),
        },
        JsonNode::String(s) => Ok(Value::Str(s)),
        other => Err(other),
    }
}

/// Wrap a cast result back into a JSON node
pub fn into_node(value: Value) -> Result<JsonNode, CastError> {
    match value {
        Value::Bool(b) => Ok(JsonNode::Bool(b)),
        Value::Int(i) => Ok(JsonNode::Number(i.into())),
        Value::Float(f) => Number::from_f64(f).map(JsonNode::Number).ok_or_else(|| {
            CastError::new(Kind::Float, Kind::Json, f).with_reason("non-finite numbers cannot be stored in JSON")
        }),
        Value::Str(s) => Ok(JsonNode::String(s)),
        Value::Json(node) => Ok(node),
        Value::Time(ts) => Err(CastError::new(Kind::Time, Kind::Json, ts)
            .with_reason("timestamps cannot be stored inside JSON")),
    }
}

/// The json row of the matrix.
///
/// Documents (arrays, objects, null) become compact text or stay as they
/// are; every other target is an error. A value holding a scalar node is
/// cast by the row of the scalar it holds.
pub fn from_json(node: JsonNode, target: Kind, codec: &TimestampCodec) -> Result<Value, CastError> {
    if target == Kind::Json {
        return Ok(Value::Json(node));
    }

    match into_scalar(node) {
        Ok(Value::Bool(b)) => scalar::from_bool(b, target),
        Ok(Value::Int(i)) => scalar::from_int(i, target),
        Ok(Value::Float(f)) => scalar::from_float(f, target),
        Ok(Value::Str(s)) => text::from_text(s, target, codec),
        Ok(other) => Err(CastError::unsupported(other.kind(), target, other)),
        Err(doc) => match target {
            Kind::Str => Ok(Value::Str(doc.to_string())),
            _ => Err(CastError::new(Kind::Json, target, &doc)
                .with_reason("only string and json accept a JSON document")),
        },
    }
}
