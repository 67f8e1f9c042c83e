//! Timestamp codec and the timestamp row of the matrix
//!
//! Patterns are strftime-style. On top of what `chrono` understands, `%N`
//! (nanoseconds, 9 digits), `%3N`, `%6N`, `%9N` and `%L` (milliseconds) are
//! accepted for fractional seconds. When parsing, `.%N` reads any number of
//! fraction digits and may be absent from the input.
//!
//! Copyright (c) 2025 Typecast Team
//! Licensed under the Apache-2.0 license

use super::CastError;
use crate::error::ConfigError;
use crate::value::{Kind, Timestamp, Value};
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use std::fmt::{self, Write};
use std::str::FromStr;

/// Pattern used when a column does not configure one
pub const DEFAULT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S.%N %z";

/// Date used when a pattern carries only a time of day
pub const DEFAULT_DATE: &str = "1970-01-01";

/// A timezone: a fixed UTC offset or an IANA zone
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Zone {
    Fixed(FixedOffset),
    Named(Tz),
}

impl Zone {
    pub fn utc() -> Self {
        Zone::Named(Tz::UTC)
    }

    /// Accepts `UTC`, `Z`, offsets such as `+09:00`, and IANA names
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("utc") || s == "Z" {
            return Some(Self::utc());
        }
        if let Ok(offset) = FixedOffset::from_str(s) {
            return Some(Zone::Fixed(offset));
        }
        Tz::from_str(s).ok().map(Zone::Named)
    }

    /// Earliest instant for a local wall-clock time, `None` inside a DST gap
    fn localize(&self, naive: &NaiveDateTime) -> Option<DateTime<Utc>> {
        match self {
            Zone::Fixed(offset) => offset
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
            Zone::Named(tz) => tz
                .from_local_datetime(naive)
                .earliest()
                .map(|dt| dt.with_timezone(&Utc)),
        }
    }
}

impl Default for Zone {
    fn default() -> Self {
        Self::utc()
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Zone::Fixed(offset) => write!(f, "{}", offset),
            Zone::Named(tz) => f.write_str(tz.name()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Direction {
    Format,
    Parse,
}

/// Formats and parses timestamps with one pattern, zone and default date
#[derive(Debug, Clone)]
pub struct TimestampCodec {
    pattern: String,
    format_pattern: String,
    parse_pattern: String,
    epoch_input: bool,
    zone: Zone,
    default_date: NaiveDate,
}

impl TimestampCodec {
    pub fn new(pattern: &str, zone: Zone, default_date: NaiveDate) -> Result<Self, ConfigError> {
        let format_pattern = translate(pattern, Direction::Format)
            .map_err(|message| invalid_pattern(pattern, message))?;
        let parse_pattern = translate(pattern, Direction::Parse)
            .map_err(|message| invalid_pattern(pattern, message))?;

        for translated in [&format_pattern, &parse_pattern] {
            if StrftimeItems::new(translated).any(|item| matches!(item, Item::Error)) {
                return Err(invalid_pattern(pattern, "unrecognized conversion specifier"));
            }
        }

        Ok(Self {
            pattern: pattern.to_string(),
            format_pattern,
            parse_pattern,
            epoch_input: pattern.contains("%s"),
            zone,
            default_date,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn zone(&self) -> Zone {
        self.zone
    }

    pub fn default_date(&self) -> NaiveDate {
        self.default_date
    }

    /// Render `ts` in the codec's zone
    pub fn format(&self, ts: &Timestamp) -> Result<String, CastError> {
        let instant = ts.instant();
        let mut out = String::new();
        let written = match self.zone {
            Zone::Fixed(offset) => write!(
                out,
                "{}",
                instant.with_timezone(&offset).format(&self.format_pattern)
            ),
            Zone::Named(tz) => write!(
                out,
                "{}",
                instant.with_timezone(&tz).format(&self.format_pattern)
            ),
        };
        written.map_err(|_| {
            CastError::new(Kind::Time, Kind::Str, ts)
                .with_reason(format!("cannot render with '{}'", self.pattern))
        })?;
        Ok(out)
    }

    /// Read a timestamp.
    ///
    /// An offset in the input wins over the codec's zone. Otherwise the text is
    /// read as a local date-time, a time of day on the default date, or a date
    /// at midnight, in that order.
    pub fn parse(&self, text: &str) -> Result<Timestamp, CastError> {
        let pattern = self.parse_pattern.as_str();
        if let Ok(dt) = DateTime::parse_from_str(text, pattern) {
            return Ok(Timestamp::from_instant(dt.with_timezone(&Utc)).with_zone(Zone::Fixed(*dt.offset())));
        }

        let naive = match NaiveDateTime::parse_from_str(text, pattern) {
            Ok(naive) => naive,
            Err(first) => NaiveTime::parse_from_str(text, pattern)
                .map(|time| self.default_date.and_time(time))
                .or_else(|_| {
                    NaiveDate::parse_from_str(text, pattern).map(|date| date.and_time(NaiveTime::MIN))
                })
                .map_err(|_| {
                    unreadable(text).with_reason(format!("does not match '{}': {}", self.pattern, first))
                })?,
        };

        // epoch seconds are absolute, whatever the configured zone
        let zone = if self.epoch_input { Zone::utc() } else { self.zone };
        zone.localize(&naive)
            .map(|instant| Timestamp::from_instant(instant).with_zone(zone))
            .ok_or_else(|| unreadable(text).with_reason(format!("local time does not exist in {}", zone)))
    }
}

impl Default for TimestampCodec {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_TIMESTAMP_FORMAT.to_string(),
            format_pattern: "%Y-%m-%d %H:%M:%S.%9f %z".to_string(),
            parse_pattern: "%Y-%m-%d %H:%M:%S%.f %z".to_string(),
            epoch_input: false,
            zone: Zone::utc(),
            default_date: NaiveDate::default(),
        }
    }
}

/// The timestamp row of the matrix
pub fn from_timestamp(ts: Timestamp, target: Kind, codec: &TimestampCodec) -> Result<Value, CastError> {
    match target {
        Kind::Bool | Kind::Json => Err(CastError::unsupported(Kind::Time, target, ts)),
        Kind::Int => Ok(Value::Int(ts.epoch_second())),
        Kind::Float => Ok(Value::Float(
            ts.epoch_second() as f64 + f64::from(ts.nano()) / 1e9,
        )),
        Kind::Str => codec.format(&ts).map(Value::Str),
        Kind::Time => Ok(Value::Time(ts)),
    }
}

fn unreadable(text: &str) -> CastError {
    CastError::new(Kind::Str, Kind::Time, format!("{:?}", text))
}

fn invalid_pattern(pattern: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidTimestampFormat {
        pattern: pattern.to_string(),
        message: message.into(),
    }
}

/// Rewrite `%N`-style fraction specifiers into chrono's dialect
fn translate(pattern: &str, direction: Direction) -> Result<String, String> {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut chars = pattern.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        let mut width = String::new();
        while let Some(digit) = chars.next_if(char::is_ascii_digit) {
            width.push(digit);
        }

        match chars.next() {
            Some('N') => push_fraction(&mut out, &width, direction)?,
            Some('L') if width.is_empty() => push_fraction(&mut out, "3", direction)?,
            Some(other) => {
                out.push('%');
                out.push_str(&width);
                out.push(other);
            }
            None => return Err("pattern ends with a bare '%'".to_string()),
        }
    }

    Ok(out)
}

fn push_fraction(out: &mut String, width: &str, direction: Direction) -> Result<(), String> {
    let digits = match width {
        "" | "9" => 9,
        "6" => 6,
        "3" => 3,
        other => return Err(format!("%{}N: fraction width must be 3, 6 or 9", other)),
    };

    match direction {
        Direction::Format => out.push_str(&format!("%{}f", digits)),
        Direction::Parse => {
            if out.ends_with('.') {
                out.pop();
                out.push_str("%.f");
            } else {
                out.push_str("%f");
            }
        }
    }
    Ok(())
}
