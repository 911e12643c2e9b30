//! Lenient ISO-8601 date-time handling for event payloads.
//!
//! Inputs either carry an offset (`2025-07-29T10:00:00Z`,
//! `2025-07-29T12:00:00+02:00`) or are plain local date-times
//! (`2025-07-29T10:00:00`). Local values are taken as UTC.

use chrono::{DateTime, NaiveDateTime, ParseError, Utc};
use serde::{de, Deserialize, Deserializer};

const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

pub fn parse(value: &str) -> Result<DateTime<Utc>, ParseError> {
    let offset_err = match DateTime::parse_from_rfc3339(value) {
        Ok(with_offset) => return Ok(with_offset.with_timezone(&Utc)),
        Err(err) => err,
    };
    for format in LOCAL_FORMATS {
        if let Ok(local) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(local.and_utc());
        }
    }
    Err(offset_err)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse(&raw).map_err(|err| de::Error::custom(format!("invalid date-time '{raw}': {err}")))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Timelike};

    use super::*;

    #[test]
    fn parses_zulu_and_offsets_into_utc() {
        let zulu = parse("2025-07-29T10:00:00Z").unwrap();
        assert_eq!(zulu, Utc.with_ymd_and_hms(2025, 7, 29, 10, 0, 0).unwrap());

        let shifted = parse("2025-07-29T12:00:00+02:00").unwrap();
        assert_eq!(shifted, zulu);
    }

    #[test]
    fn local_date_times_are_read_as_utc() {
        let local = parse("2025-07-29T10:15:30").unwrap();
        assert_eq!(local, Utc.with_ymd_and_hms(2025, 7, 29, 10, 15, 30).unwrap());

        let fractional = parse("2025-07-29T10:15:30.250").unwrap();
        assert_eq!(fractional.nanosecond(), 250_000_000);

        let no_seconds = parse("2025-07-29T10:15").unwrap();
        assert_eq!(no_seconds.minute(), 15);
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse("yesterday").is_err());
        assert!(parse("2025-13-01T00:00:00Z").is_err());
    }
}
