//! ISO-8601 calendar types.
//!
//! Each parser separates three failure causes: a token that is not shaped
//! like ISO-8601 at all (generic failure), a well-shaped token naming an
//! impossible calendar date (`invalid date`), and a well-shaped token naming
//! an impossible time of day (`invalid time`). Shape is checked with a regex
//! first so the calendar checks only ever see numeric fields.

use std::sync::LazyLock;

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use regex::{Captures, Regex};

use crate::error::Failure;
use crate::value::Value;

use super::{Raw, SwitchFlag, ValueSpec, ValueType, require_token};

const INVALID_DATE: &str = "invalid date";
const INVALID_TIME: &str = "invalid time";
const MISSING_OFFSET: &str = "missing offset";

static DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})$").expect("valid date regex")
});

static TIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<h>\d{2}):(?P<mi>\d{2}):(?P<s>\d{2})(?:\.(?P<frac>\d{1,9}))?$")
        .expect("valid time regex")
});

static DATETIME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<y>\d{4})-(?P<mo>\d{2})-(?P<d>\d{2})[T ](?P<h>\d{2}):(?P<mi>\d{2}):(?P<s>\d{2})(?:\.(?P<frac>\d{1,9}))?(?P<offset>Z|z|[+-]\d{2}:?\d{2})?$",
    )
    .expect("valid datetime regex")
});

fn field(caps: &Captures<'_>, name: &str) -> u32 {
    caps.name(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

fn date_from(caps: &Captures<'_>) -> Result<NaiveDate, Failure> {
    let year = i32::try_from(field(caps, "y")).map_err(|_| Failure::message(INVALID_DATE))?;
    NaiveDate::from_ymd_opt(year, field(caps, "mo"), field(caps, "d"))
        .ok_or_else(|| Failure::message(INVALID_DATE))
}

fn time_from(caps: &Captures<'_>) -> Result<NaiveTime, Failure> {
    let nanos = caps
        .name("frac")
        .map(|m| {
            let digits = m.as_str();
            let scale = 10u32.pow(9 - digits.len() as u32);
            digits.parse::<u32>().unwrap_or(0) * scale
        })
        .unwrap_or(0);
    NaiveTime::from_hms_nano_opt(field(caps, "h"), field(caps, "mi"), field(caps, "s"), nanos)
        .ok_or_else(|| Failure::message(INVALID_TIME))
}

fn offset_from(text: &str) -> Result<FixedOffset, Failure> {
    if text.eq_ignore_ascii_case("z") {
        return FixedOffset::east_opt(0).ok_or(Failure::Generic);
    }
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text[1..].chars().filter(|c| *c != ':').collect();
    let hours: i32 = digits[..2].parse().map_err(|_| Failure::Generic)?;
    let minutes: i32 = digits[2..].parse().map_err(|_| Failure::Generic)?;
    if hours > 23 || minutes > 59 {
        return Err(Failure::Generic);
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).ok_or(Failure::Generic)
}

fn naive_datetime_from(caps: &Captures<'_>) -> Result<chrono::NaiveDateTime, Failure> {
    let date = date_from(caps)?;
    let time = time_from(caps)?;
    Ok(date.and_time(time))
}

/// Calendar date, `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDate;

impl ValueType for IsoDate {
    fn name(&self) -> String {
        "ISO-8601 date".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let caps = DATE.captures(require_token(raw)?).ok_or(Failure::Generic)?;
        date_from(&caps).map(Value::Date)
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Date
    }
}

/// Time of day, `HH:MM:SS[.fraction]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoTime;

impl ValueType for IsoTime {
    fn name(&self) -> String {
        "ISO-8601 time".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let caps = TIME.captures(require_token(raw)?).ok_or(Failure::Generic)?;
        time_from(&caps).map(Value::Time)
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::Time
    }
}

/// Date and time with a mandatory UTC offset, normalized to UTC.
///
/// # Examples
///
/// ```
/// use optschema_core::{IsoDateTime, Raw, SwitchFlag, ValueType};
///
/// let value = IsoDateTime
///     .parse(SwitchFlag::Primary, Raw::Token("2024-05-01T12:00:00+02:00"))
///     .unwrap();
/// assert_eq!(value.to_string(), "2024-05-01T10:00:00Z");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoDateTime;

impl ValueType for IsoDateTime {
    fn name(&self) -> String {
        "ISO-8601 datetime".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let caps = DATETIME
            .captures(require_token(raw)?)
            .ok_or(Failure::Generic)?;
        let naive = naive_datetime_from(&caps)?;
        let offset = caps
            .name("offset")
            .ok_or_else(|| Failure::message(MISSING_OFFSET))?;
        let offset = offset_from(offset.as_str())?;
        let local = offset
            .from_local_datetime(&naive)
            .single()
            .ok_or(Failure::Generic)?;
        Ok(Value::DateTime(local.with_timezone(&Utc)))
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::DateTime
    }
}

/// Date and time without zone; any offset present is discarded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IsoNaiveDateTime;

impl ValueType for IsoNaiveDateTime {
    fn name(&self) -> String {
        "ISO-8601 naive datetime".to_string()
    }

    fn parse(&self, _flag: SwitchFlag, raw: Raw<'_>) -> Result<Value, Failure> {
        let caps = DATETIME
            .captures(require_token(raw)?)
            .ok_or(Failure::Generic)?;
        naive_datetime_from(&caps).map(Value::NaiveDateTime)
    }

    fn spec(&self) -> ValueSpec {
        ValueSpec::NaiveDateTime
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Datelike, Timelike};

    use super::*;

    fn parse(ty: &dyn ValueType, token: &str) -> Result<Value, Failure> {
        ty.parse(SwitchFlag::Primary, Raw::Token(token))
    }

    fn message(result: Result<Value, Failure>) -> String {
        match result {
            Err(Failure::Message(msg)) => msg.to_string(),
            other => panic!("expected message failure, got {other:?}"),
        }
    }

    #[test]
    fn test_date() {
        let Ok(Value::Date(date)) = parse(&IsoDate, "2024-02-29") else {
            panic!("leap day should parse");
        };
        assert_eq!((date.year(), date.month(), date.day()), (2024, 2, 29));
        assert_eq!(message(parse(&IsoDate, "2023-02-29")), INVALID_DATE);
        assert_eq!(message(parse(&IsoDate, "2023-13-01")), INVALID_DATE);
        assert_eq!(parse(&IsoDate, "2023-1-01"), Err(Failure::Generic));
        assert_eq!(parse(&IsoDate, "yesterday"), Err(Failure::Generic));
    }

    #[test]
    fn test_time() {
        let Ok(Value::Time(time)) = parse(&IsoTime, "23:59:07.25") else {
            panic!("time should parse");
        };
        assert_eq!((time.hour(), time.minute(), time.second()), (23, 59, 7));
        assert_eq!(time.nanosecond(), 250_000_000);
        assert_eq!(message(parse(&IsoTime, "24:00:00")), INVALID_TIME);
        assert_eq!(message(parse(&IsoTime, "12:60:00")), INVALID_TIME);
        assert_eq!(parse(&IsoTime, "12:00"), Err(Failure::Generic));
    }

    #[test]
    fn test_datetime_normalizes_to_utc() {
        let Ok(value) = parse(&IsoDateTime, "2024-01-01T01:30:00-02:30") else {
            panic!("datetime should parse");
        };
        assert_eq!(value.to_string(), "2024-01-01T04:00:00Z");
        assert_eq!(
            parse(&IsoDateTime, "2024-01-01 00:00:00Z").map(|v| v.to_string()),
            Ok("2024-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn test_datetime_failure_causes() {
        assert_eq!(message(parse(&IsoDateTime, "2024-01-01T00:00:00")), MISSING_OFFSET);
        assert_eq!(message(parse(&IsoDateTime, "2024-02-30T00:00:00Z")), INVALID_DATE);
        assert_eq!(message(parse(&IsoDateTime, "2024-02-03T25:00:00Z")), INVALID_TIME);
        assert_eq!(parse(&IsoDateTime, "2024-02-03"), Err(Failure::Generic));
        assert_eq!(parse(&IsoDateTime, "2024-02-03T00:00:00+24:00"), Err(Failure::Generic));
    }

    #[test]
    fn test_naive_datetime_discards_offset() {
        let with_offset = parse(&IsoNaiveDateTime, "2024-06-01T08:00:00+05:00");
        let without = parse(&IsoNaiveDateTime, "2024-06-01T08:00:00");
        assert_eq!(with_offset, without);
        assert_eq!(
            without.map(|v| v.to_string()),
            Ok("2024-06-01T08:00:00".to_string())
        );
    }

    #[test]
    fn test_format_then_parse_roundtrip() {
        let value = parse(&IsoDateTime, "2030-12-31T23:59:59.5Z").unwrap();
        assert_eq!(parse(&IsoDateTime, &value.to_string()), Ok(value));
    }
}
