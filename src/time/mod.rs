//! Metadata date parsing
//!
//! iCloud exports write capture dates as free-form English strings such as
//! `Monday January 01,2023 10:30 AM GMT`. This module tokenizes that shape,
//! converts the 12-hour clock, resolves the zone abbreviation and yields an
//! absolute instant normalized to UTC.

pub mod zone;

use chrono::{DateTime, FixedOffset, Month, NaiveDate, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use std::sync::OnceLock;
use std::time::SystemTime;
use thiserror::Error;
use tracing::trace;

/// Years accepted by the parser; anything outside is treated as corrupt metadata
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1900..=2100;

/// Format used when printing a capture time to the user
pub const DISPLAY_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Structural pattern of a metadata date; every separator tolerates extra whitespace
static DATE_PATTERN: OnceLock<Regex> = OnceLock::new();

fn date_pattern() -> &'static Regex {
    DATE_PATTERN.get_or_init(|| {
        Regex::new(
            r"(?x)
            ^\s*
            (?P<weekday>[[:alpha:]]+)\s*,?\s+
            (?P<month>[[:alpha:]]+)\.?\s+
            (?P<day>\d{1,2})\s*,\s*
            (?P<year>\d{4})\s+
            (?P<hour>\d{1,2})\s*:\s*(?P<minute>\d{2})\s*
            (?P<meridiem>[AaPp][Mm])\s+
            (?P<zone>[[:alpha:]]+)
            \s*$",
        )
        .expect("date pattern is a valid regex")
    })
}

/// Errors produced while parsing a metadata date string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DateParseError {
    #[error("'{0}' does not match the expected date layout")]
    Shape(String),

    #[error("unknown month name '{0}'")]
    Month(String),

    #[error("unrecognized timezone abbreviation '{0}'")]
    Zone(String),

    #[error("year {0} is outside the accepted range")]
    OutOfRange(i32),

    #[error("invalid calendar date or time in '{0}'")]
    InvalidDate(String),
}

/// An absolute capture instant together with the offset it was recorded in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTime {
    instant: DateTime<Utc>,
    offset: FixedOffset,
}

impl CaptureTime {
    pub fn new(instant: DateTime<Utc>, offset: FixedOffset) -> Self {
        Self { instant, offset }
    }

    /// The instant normalized to UTC
    pub fn utc(&self) -> DateTime<Utc> {
        self.instant
    }

    /// The offset of the zone the metadata was written in
    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// The instant as wall-clock time in its originating zone
    pub fn local(&self) -> DateTime<FixedOffset> {
        self.instant.with_timezone(&self.offset)
    }

    pub fn system_time(&self) -> SystemTime {
        self.instant.into()
    }

    /// Human readable form, e.g. `01.01.2023 10:30`
    pub fn display(&self) -> String {
        self.local().format(DISPLAY_FORMAT).to_string()
    }

    /// ISO-8601 instant in UTC, e.g. `2023-01-01T10:30:00Z`
    pub fn to_rfc3339(&self) -> String {
        self.instant.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

/// Parse a metadata date of the form
/// `<Weekday> <Month> <Day>,<Year> <Hour>:<Minute> <AM/PM> <Zone>`.
///
/// The weekday is informational only and never checked against the date.
pub fn parse_metadata_date(input: &str) -> Result<CaptureTime, DateParseError> {
    let caps = date_pattern()
        .captures(input)
        .ok_or_else(|| DateParseError::Shape(input.trim().to_string()))?;

    let month_name = &caps["month"];
    let month: Month = month_name
        .parse()
        .map_err(|_| DateParseError::Month(month_name.to_string()))?;

    let zone_name = &caps["zone"];
    let offset =
        zone::offset_for(zone_name).ok_or_else(|| DateParseError::Zone(zone_name.to_string()))?;

    let invalid = || DateParseError::InvalidDate(input.trim().to_string());

    let year: i32 = caps["year"].parse().map_err(|_| invalid())?;
    if !YEAR_RANGE.contains(&year) {
        return Err(DateParseError::OutOfRange(year));
    }
    let day: u32 = caps["day"].parse().map_err(|_| invalid())?;
    let hour12: u32 = caps["hour"].parse().map_err(|_| invalid())?;
    let minute: u32 = caps["minute"].parse().map_err(|_| invalid())?;
    let pm = caps["meridiem"].eq_ignore_ascii_case("pm");
    let hour = to_24_hour(hour12, pm).ok_or_else(invalid)?;

    let naive = NaiveDate::from_ymd_opt(year, month.number_from_month(), day)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .ok_or_else(invalid)?;

    let local = offset
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(invalid)?;

    trace!(input, weekday = &caps["weekday"], %local, "Parsed metadata date");

    Ok(CaptureTime::new(local.with_timezone(&Utc), offset))
}

/// Convert a 12-hour clock reading to 24-hour; `None` for hours outside 1..=12
fn to_24_hour(hour: u32, pm: bool) -> Option<u32> {
    match (hour, pm) {
        (1..=11, false) => Some(hour),
        (12, false) => Some(0),
        (1..=11, true) => Some(hour + 12),
        (12, true) => Some(12),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_round_trip_to_iso() {
        let parsed = parse_metadata_date("Monday January 01,2023 10:30 AM GMT").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-01T10:30:00Z");
        assert_eq!(parsed.display(), "01.01.2023 10:30");
    }

    #[test]
    fn test_pm_and_midnight_noon() {
        let pm = parse_metadata_date("Friday March 15,2024 3:05 PM GMT").unwrap();
        assert_eq!(pm.utc().hour(), 15);
        assert_eq!(pm.utc().minute(), 5);

        let midnight = parse_metadata_date("Friday March 15,2024 12:00 AM GMT").unwrap();
        assert_eq!(midnight.utc().hour(), 0);

        let noon = parse_metadata_date("Friday March 15,2024 12:00 PM GMT").unwrap();
        assert_eq!(noon.utc().hour(), 12);
    }

    #[test]
    fn test_whitespace_variance() {
        let parsed =
            parse_metadata_date("  Monday   January  01 , 2023   10:30AM   GMT  ").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-01T10:30:00Z");
    }

    #[test]
    fn test_weekday_not_validated() {
        // 2023-01-01 was a Sunday
        let parsed = parse_metadata_date("Thursday January 01,2023 10:30 AM GMT").unwrap();
        assert_eq!(parsed.utc().day(), 1);
    }

    #[test]
    fn test_month_abbreviation_and_case() {
        let parsed = parse_metadata_date("monday jan 02,2023 09:00 am gmt").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-01-02T09:00:00Z");
    }

    #[test]
    fn test_offset_normalized_to_utc() {
        let parsed = parse_metadata_date("Saturday July 01,2023 08:15 PM PDT").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2023-07-02T03:15:00Z");
        assert_eq!(parsed.display(), "01.07.2023 20:15");
        assert_eq!(parsed.offset(), FixedOffset::west_opt(7 * 3600).unwrap());
    }

    #[test]
    fn test_every_known_zone_parses() {
        for abbrev in zone::known_abbreviations() {
            let input = format!("Monday January 01,2023 10:30 AM {abbrev}");
            assert!(parse_metadata_date(&input).is_ok(), "{input} should parse");
        }
    }

    #[test]
    fn test_unknown_zone_fails_closed() {
        let err = parse_metadata_date("Monday January 01,2023 10:30 AM XYZ").unwrap_err();
        assert_eq!(err, DateParseError::Zone("XYZ".to_string()));
    }

    #[test]
    fn test_malformed_shapes() {
        for input in [
            "",
            "not a date",
            "2023-01-01T10:30:00Z",
            "Monday January 01 2023 10:30 AM GMT",
            "Monday January 01,2023 10:30 GMT",
        ] {
            assert!(
                matches!(parse_metadata_date(input), Err(DateParseError::Shape(_))),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_invalid_values() {
        assert!(matches!(
            parse_metadata_date("Monday Smarch 01,2023 10:30 AM GMT"),
            Err(DateParseError::Month(_))
        ));
        assert!(matches!(
            parse_metadata_date("Monday February 30,2023 10:30 AM GMT"),
            Err(DateParseError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_metadata_date("Monday January 01,2023 13:30 PM GMT"),
            Err(DateParseError::InvalidDate(_))
        ));
        assert!(matches!(
            parse_metadata_date("Monday January 01,2023 10:75 AM GMT"),
            Err(DateParseError::InvalidDate(_))
        ));
        assert_eq!(
            parse_metadata_date("Monday January 01,1850 10:30 AM GMT"),
            Err(DateParseError::OutOfRange(1850))
        );
    }

    #[test]
    fn test_deterministic() {
        let input = "Tuesday October 10,2023 07:45 PM CEST";
        assert_eq!(
            parse_metadata_date(input).unwrap(),
            parse_metadata_date(input).unwrap()
        );
    }
}
