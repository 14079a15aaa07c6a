use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use internals::SkipReason;

/// ISO-8601 shapes carrying an explicit offset that RFC 3339 parsing rejects.
const OFFSET_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M%:z",
    "%Y-%m-%d %H:%M%:z",
    "%Y%m%dT%H%M%S%.f%z",
    "%Y%m%dT%H%M%z",
];

/// Timezone-naive shapes, read as UTC.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y%m%dT%H%M%S%.f",
    "%Y%m%dT%H%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y%m%d"];

/// Adds `:00` minutes to an hour-only time such as `2024-03-05T10` or
/// `2024-03-05T10+02:00`. chrono will not build a time without minutes.
fn expand_hour_only(value: &str) -> Option<String> {
    let (date, time) = (value.get(..11)?, value.get(11..)?);
    let (hour, offset) = (time.get(..2)?, time.get(2..)?);

    let is_hour_only = date.ends_with(['T', ' '])
        && hour.bytes().all(|b| b.is_ascii_digit())
        && (offset.is_empty() || offset.starts_with(['+', '-']));

    is_hour_only.then(|| format!("{}{}:00{}", date, hour, offset))
}

/// Parses the `date` field of a message into a UTC timestamp.
///
/// A trailing `Z` is treated as `+00:00`. Values with any other offset are
/// converted to UTC, so `2024-03-05T23:30:00-05:00` falls on March 6th.
/// Naive date-times and bare dates are taken to already be in UTC. Both the
/// extended (`2024-03-05T10:00:00`) and basic (`20240305T100000`) forms are
/// accepted. Surrounding whitespace is not.
pub fn parse_message_date(value: &str) -> Result<DateTime<Utc>, SkipReason> {
    // chrono skips leading whitespace before numeric fields
    if value.trim() != value {
        return Err(SkipReason::MalformedDate {
            value: value.to_string(),
            reason: "surrounding whitespace".to_string(),
        });
    }

    let normalized = match value.strip_suffix(['Z', 'z']) {
        Some(rest) => format!("{}+00:00", rest),
        None => value.to_string(),
    };
    let normalized = expand_hour_only(&normalized).unwrap_or(normalized);

    let rfc3339_err = match DateTime::parse_from_rfc3339(&normalized) {
        Ok(date) => return Ok(date.with_timezone(&Utc)),
        Err(e) => e,
    };

    for format in OFFSET_FORMATS {
        if let Ok(date) = DateTime::parse_from_str(&normalized, format) {
            return Ok(date.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(date) = NaiveDateTime::parse_from_str(&normalized, format) {
            return Ok(date.and_utc());
        }
    }

    for format in DATE_FORMATS {
        if let Some(midnight) = NaiveDate::parse_from_str(&normalized, format)
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0))
        {
            return Ok(midnight.and_utc());
        }
    }

    Err(SkipReason::MalformedDate {
        value: value.to_string(),
        reason: rfc3339_err.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_zulu_suffix() {
        assert_eq!(
            parse_message_date("2024-03-05T10:00:00Z").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
    }

    #[test]
    fn test_zulu_suffix_equals_explicit_utc_offset() {
        assert_eq!(
            parse_message_date("2024-03-05T10:00:00Z").unwrap(),
            parse_message_date("2024-03-05T10:00:00+00:00").unwrap()
        );
    }

    #[test]
    fn test_fractional_seconds() {
        let date = parse_message_date("2024-03-05T10:00:00.123456Z").unwrap();
        assert_eq!(date.timestamp_subsec_micros(), 123456);
    }

    #[test]
    fn test_negative_offset_rolls_into_next_utc_day() {
        assert_eq!(
            parse_message_date("2024-03-05T23:30:00-05:00").unwrap(),
            utc(2024, 3, 6, 4, 30, 0)
        );
    }

    #[test]
    fn test_positive_offset_rolls_into_previous_utc_day() {
        assert_eq!(
            parse_message_date("2024-01-01T01:00:00+02:00").unwrap(),
            utc(2023, 12, 31, 23, 0, 0)
        );
    }

    #[test]
    fn test_offset_without_colon() {
        assert_eq!(
            parse_message_date("2024-03-05T10:00:00+0100").unwrap(),
            utc(2024, 3, 5, 9, 0, 0)
        );
    }

    #[test]
    fn test_minutes_precision_with_zulu() {
        assert_eq!(
            parse_message_date("2024-03-05T10:00Z").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
    }

    #[test]
    fn test_naive_datetime_is_utc() {
        assert_eq!(
            parse_message_date("2024-03-05T10:00:00").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_message_date("2024-03-05 10:00:00").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
    }

    #[test]
    fn test_bare_date_is_midnight_utc() {
        assert_eq!(
            parse_message_date("2024-03-05").unwrap(),
            utc(2024, 3, 5, 0, 0, 0)
        );
    }

    #[test]
    fn test_basic_format() {
        assert_eq!(
            parse_message_date("20240305T100000Z").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_message_date("20240305T233000-0500").unwrap(),
            utc(2024, 3, 6, 4, 30, 0)
        );
        assert_eq!(
            parse_message_date("20240305T1000").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_message_date("20240305").unwrap(),
            utc(2024, 3, 5, 0, 0, 0)
        );
    }

    #[test]
    fn test_hour_only_time() {
        assert_eq!(
            parse_message_date("2024-03-05T10").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_message_date("2024-03-05T10Z").unwrap(),
            utc(2024, 3, 5, 10, 0, 0)
        );
        assert_eq!(
            parse_message_date("2024-03-05T22-05:00").unwrap(),
            utc(2024, 3, 6, 3, 0, 0)
        );
        assert!(parse_message_date("2024-03-05T24").is_err());
    }

    #[test]
    fn test_surrounding_whitespace_is_malformed() {
        assert!(matches!(
            parse_message_date(" 2024-03-05 "),
            Err(SkipReason::MalformedDate { .. })
        ));
        assert!(parse_message_date(" 2024-03-05T10:00:00Z").is_err());
        assert!(parse_message_date("2024-03-05T10:00:00Z\n").is_err());
    }

    #[test]
    fn test_leap_day() {
        assert!(parse_message_date("2024-02-29T00:00:00Z").is_ok());
        assert!(parse_message_date("2023-02-29T00:00:00Z").is_err());
    }

    #[test]
    fn test_garbage_is_malformed() {
        match parse_message_date("not-a-date") {
            Err(SkipReason::MalformedDate { value, .. }) => assert_eq!(value, "not-a-date"),
            other => panic!("Expected MalformedDate, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_fields_are_malformed() {
        assert!(parse_message_date("2024-13-01T00:00:00Z").is_err());
        assert!(parse_message_date("2024-03-05T25:00:00Z").is_err());
    }
}
