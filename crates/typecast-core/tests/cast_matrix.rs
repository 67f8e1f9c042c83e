//! Integration tests for the cast matrix and the timestamp codec

use chrono::NaiveDate;
use serde_json::json;
use typecast_core::{cast, Kind, Timestamp, TimestampCodec, Value, Zone};

fn codec(pattern: &str) -> TimestampCodec {
    TimestampCodec::new(pattern, Zone::utc(), NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()).unwrap()
}

fn default_codec() -> TimestampCodec {
    TimestampCodec::default()
}

#[test]
fn test_boolean_spellings() {
    let c = default_codec();
    for text in ["true", "True", "TRUE", "yes", "Y", "on", "1", "t"] {
        assert_eq!(cast(text.into(), Kind::Bool, &c).unwrap(), Value::Bool(true), "{}", text);
    }
    for text in ["false", "False", "FALSE", "no", "N", "off", "0", "f"] {
        assert_eq!(cast(text.into(), Kind::Bool, &c).unwrap(), Value::Bool(false), "{}", text);
    }
    for text in ["foo", "tRUE", " true", "2", ""] {
        assert!(cast(text.into(), Kind::Bool, &c).is_err(), "{}", text);
    }
}

#[test]
fn test_long_from_double_truncates() {
    let c = default_codec();
    assert_eq!(cast(Value::Float(3.9), Kind::Int, &c).unwrap(), Value::Int(3));
    assert_eq!(cast(Value::Float(-3.9), Kind::Int, &c).unwrap(), Value::Int(-3));
    assert!(cast(Value::Float(f64::NAN), Kind::Int, &c).is_err());
    assert!(cast(Value::Float(1e300), Kind::Int, &c).is_err());
}

#[test]
fn test_long_round_trip_through_string() {
    let c = default_codec();
    for n in [0i64, -1, 42, i64::MAX, i64::MIN] {
        let text = cast(Value::Int(n), Kind::Str, &c).unwrap();
        assert_eq!(cast(text, Kind::Int, &c).unwrap(), Value::Int(n));
    }
}

#[test]
fn test_double_to_timestamp() {
    let c = default_codec();
    let ts = cast(Value::Float(1463084053.5), Kind::Time, &c).unwrap();
    let ts = ts.as_timestamp().unwrap();
    assert_eq!(ts.epoch_second(), 1463084053);
    assert_eq!(ts.nano(), 500_000_000);
}

#[test]
fn test_long_to_timestamp_and_back() {
    let c = default_codec();
    let ts = cast(Value::Int(1692877381), Kind::Time, &c).unwrap();
    assert_eq!(cast(ts, Kind::Int, &c).unwrap(), Value::Int(1692877381));
}

#[test]
fn test_long_to_timestamp_formats_with_default_pattern() {
    let c = default_codec();
    let ts = cast(Value::Int(12345), Kind::Time, &c).unwrap();
    assert_eq!(
        cast(ts, Kind::Str, &c).unwrap(),
        Value::Str("1970-01-01 03:25:45.000000000 +0000".to_string())
    );
}

#[test]
fn test_string_to_timestamp_with_fraction() {
    let c = codec("%Y-%m-%d %H:%M:%S.%N");
    let ts = cast("2016-05-12 20:14:13.123456".into(), Kind::Time, &c).unwrap();
    let ts = ts.as_timestamp().unwrap();
    assert_eq!(ts.epoch_second(), 1463084053);
    assert_eq!(ts.nano(), 123_456_000);
}

#[test]
fn test_timestamp_to_string_with_micros() {
    let c = codec("%Y-%m-%d %H:%M:%S.%6N");
    let ts = Timestamp::from_epoch(1463084053, 500_000_000).unwrap();
    assert_eq!(
        cast(ts.into(), Kind::Str, &c).unwrap(),
        Value::Str("2016-05-12 20:14:13.500000".to_string())
    );
}

#[test]
fn test_epoch_seconds_pattern() {
    let c = codec("%s");
    let ts = cast("1692877381".into(), Kind::Time, &c).unwrap();
    assert_eq!(ts.as_timestamp().unwrap().epoch_second(), 1692877381);
    assert_eq!(cast(ts, Kind::Str, &c).unwrap(), Value::Str("1692877381".to_string()));
}

#[test]
fn test_timezone_applies_to_format_and_parse() {
    let tokyo = TimestampCodec::new(
        "%Y-%m-%d %H:%M:%S",
        Zone::parse("Asia/Tokyo").unwrap(),
        NaiveDate::from_ymd_opt(1970, 1, 1).unwrap(),
    )
    .unwrap();
    let ts = cast("2016-05-13 05:14:13".into(), Kind::Time, &tokyo).unwrap();
    assert_eq!(ts.as_timestamp().unwrap().epoch_second(), 1463084053);
    assert_eq!(cast(ts, Kind::Str, &tokyo).unwrap(), Value::Str("2016-05-13 05:14:13".to_string()));
}

#[test]
fn test_json_document_to_string() {
    let c = default_codec();
    assert_eq!(
        cast(Value::Json(json!({"k": "v"})), Kind::Str, &c).unwrap(),
        Value::Str(r#"{"k":"v"}"#.to_string())
    );
    assert!(cast(Value::Json(json!([1])), Kind::Int, &c).is_err());
}

#[test]
fn test_undefined_pairs_are_errors() {
    let c = default_codec();
    let ts = Value::Time(Timestamp::from_epoch(0, 0).unwrap());
    for (value, target) in [
        (Value::Bool(true), Kind::Float),
        (Value::Bool(true), Kind::Time),
        (Value::Float(1.0), Kind::Bool),
        (ts.clone(), Kind::Bool),
        (ts, Kind::Json),
        (Value::Int(1), Kind::Json),
    ] {
        let from = value.kind();
        let err = cast(value, target, &c).unwrap_err();
        assert_eq!((err.from, err.to), (from, target));
    }
}
