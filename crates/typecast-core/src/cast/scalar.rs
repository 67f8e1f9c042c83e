//! Rows of the matrix for boolean, long and double sources

use super::CastError;
use crate::value::{Kind, Timestamp, Value};

// 2^63; the first double past i64::MAX
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

pub fn from_bool(v: bool, target: Kind) -> Result<Value, CastError> {
    match target {
        Kind::Bool => Ok(Value::Bool(v)),
        Kind::Int => Ok(Value::Int(i64::from(v))),
        Kind::Str => Ok(Value::Str(v.to_string())),
        Kind::Float | Kind::Time | Kind::Json => Err(CastError::unsupported(Kind::Bool, target, v)),
    }
}

pub fn from_int(v: i64, target: Kind) -> Result<Value, CastError> {
    match target {
        Kind::Bool => match v {
            1 => Ok(Value::Bool(true)),
            0 => Ok(Value::Bool(false)),
            _ => Err(CastError::new(Kind::Int, Kind::Bool, v)
                .with_reason("only 0 and 1 map to boolean")),
        },
        Kind::Int => Ok(Value::Int(v)),
        Kind::Float => Ok(Value::Float(v as f64)),
        Kind::Str => Ok(Value::Str(v.to_string())),
        Kind::Time => Timestamp::from_epoch(v, 0)
            .map(Value::Time)
            .ok_or_else(|| {
                CastError::new(Kind::Int, Kind::Time, v).with_reason("epoch seconds out of range")
            }),
        Kind::Json => Err(CastError::unsupported(Kind::Int, Kind::Json, v)),
    }
}

pub fn from_float(v: f64, target: Kind) -> Result<Value, CastError> {
    match target {
        Kind::Bool | Kind::Json => Err(CastError::unsupported(Kind::Float, target, v)),
        Kind::Int => truncate(v)
            .map(Value::Int)
            .map_err(|reason| CastError::new(Kind::Float, Kind::Int, v).with_reason(reason)),
        Kind::Float => Ok(Value::Float(v)),
        Kind::Str => Ok(Value::Str(format!("{:?}", v))),
        Kind::Time => float_to_timestamp(v)
            .map(Value::Time)
            .map_err(|reason| CastError::new(Kind::Float, Kind::Time, v).with_reason(reason)),
    }
}

/// Truncate toward zero
fn truncate(v: f64) -> Result<i64, &'static str> {
    if !v.is_finite() {
        return Err("not a finite number");
    }
    let t = v.trunc();
    if t < -I64_UPPER || t >= I64_UPPER {
        return Err("out of range for long");
    }
    Ok(t as i64)
}

/// Seconds are `floor(v)`, nanoseconds the rounded fraction
fn float_to_timestamp(v: f64) -> Result<Timestamp, &'static str> {
    let seconds = v.floor();
    let mut whole = truncate(seconds)?;
    let mut nanos = ((v - seconds) * 1e9).round() as u32;
    if nanos >= 1_000_000_000 {
        whole = whole.checked_add(1).ok_or("epoch seconds out of range")?;
        nanos = 0;
    }
    Timestamp::from_epoch(whole, nanos).ok_or("epoch seconds out of range")
}
