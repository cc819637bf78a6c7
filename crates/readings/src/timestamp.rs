//! Day-first timestamp parsing.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

const DATE_TIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"];

/// Parses a timestamp as written by monitor exports.
///
/// Ambiguous numeric dates are read day first. RFC 3339 values keep their offset and are
/// converted to UTC; values without an offset are taken to be UTC already. A bare date means
/// midnight.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }

    DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn reads_numeric_dates_day_first() {
        assert_eq!(
            parse_timestamp("03/04/2024 08:15"),
            Some(utc(2024, 4, 3, 8, 15, 0))
        );
        assert_eq!(
            parse_timestamp("31-01-2024 21:05:30"),
            Some(utc(2024, 1, 31, 21, 5, 30))
        );
        assert_eq!(
            parse_timestamp("15.02.2024 07:00"),
            Some(utc(2024, 2, 15, 7, 0, 0))
        );
    }

    #[test]
    fn reads_iso_forms() {
        assert_eq!(
            parse_timestamp("2024-04-03 08:15:00"),
            Some(utc(2024, 4, 3, 8, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-04-03T08:15"),
            Some(utc(2024, 4, 3, 8, 15, 0))
        );
        assert_eq!(
            parse_timestamp("2024-04-03T10:15:00+02:00"),
            Some(utc(2024, 4, 3, 8, 15, 0))
        );
    }

    #[test]
    fn bare_date_is_midnight() {
        assert_eq!(parse_timestamp(" 03/04/2024 "), Some(utc(2024, 4, 3, 0, 0, 0)));
    }

    #[test]
    fn rejects_garbage_and_impossible_dates() {
        assert_eq!(parse_timestamp(""), None);
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("31/02/2024 08:00"), None);
        assert_eq!(parse_timestamp("13/13/2024"), None);
    }
}
