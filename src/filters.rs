//! Small helpers the page views use to shape data before rendering.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::text_utils::strip_html;

const WORDS_PER_MINUTE: usize = 200;
const DURATION_UNITS: [&str; 7] = ["year", "month", "week", "day", "hour", "minute", "second"];

/// At most `count` leading items.
pub fn limit<T>(items: &[T], count: usize) -> &[T] {
    &items[..count.min(items.len())]
}

/// Formats with a strftime pattern, in UTC.
pub fn format_date(date: &DateTime<Utc>, format: &str) -> Result<String, String> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(format!("Invalid date format {}", format));
    }
    Ok(date.format(format).to_string())
}

/// RFC 3339 timestamp or plain `YYYY-MM-DD` (midnight UTC).
pub fn date_from_iso(timestamp: &str) -> Option<DateTime<Utc>> {
    if let Ok(date_time) = DateTime::parse_from_rfc3339(timestamp) {
        return Some(date_time.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(timestamp, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|d| d.and_utc())
}

/// ISO 8601 duration as text: `PT1H30M` gives `1 hour, 30 minutes`.
/// Only the units present in the duration are listed.
pub fn humanize_duration(iso: &str) -> Result<String, String> {
    lazy_static! {
        static ref DURATION_REGEX: Regex = Regex::new(
            r"^P(?:(\d+(?:[.,]\d+)?)Y)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)W)?(?:(\d+(?:[.,]\d+)?)D)?(?:T(?:(\d+(?:[.,]\d+)?)H)?(?:(\d+(?:[.,]\d+)?)M)?(?:(\d+(?:[.,]\d+)?)S)?)?$"
        ).unwrap();
    }

    let invalid = || format!("Invalid ISO 8601 duration {}", iso);
    let caps = DURATION_REGEX.captures(iso.trim()).ok_or_else(invalid)?;
    let parts: Vec<(String, &str)> = DURATION_UNITS.iter()
        .enumerate()
        .filter_map(|(idx, unit)| caps.get(idx + 1).map(|m| (m.as_str().replace(',', "."), *unit)))
        .collect();

    if parts.is_empty() {
        return Err(invalid());
    }
    Ok(human_units(&parts))
}

fn human_units(parts: &[(String, &str)]) -> String {
    parts.iter()
        .map(|(value, unit)| match value.as_str() {
            "1" => format!("1 {}", unit),
            _ => format!("{} {}s", value, unit),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Reading time of rendered html, e.g. `4 minutes`. Never below one minute.
pub fn reading_time(html: &str) -> String {
    let words = strip_html(html).split_whitespace().count();
    let minutes = words.div_ceil(WORDS_PER_MINUTE).max(1);
    human_units(&[(minutes.to_string(), "minute")])
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_limit() {
        let items = vec![1, 2, 3, 4];
        assert_eq!(limit(&items, 2), &[1, 2]);
        assert_eq!(limit(&items, 10), &[1, 2, 3, 4]);
        assert!(limit(&items, 0).is_empty());
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_date(&date, "%B %-d, %Y").unwrap(), "January 2, 2024");
        assert_eq!(format_date(&date, "%Y-%m-%d").unwrap(), "2024-01-02");
        assert!(format_date(&date, "%Q").is_err());
    }

    #[test]
    fn test_date_from_iso() {
        let expected = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        assert_eq!(date_from_iso("2024-01-02"), Some(expected));
        assert_eq!(date_from_iso("2024-01-02T02:00:00+02:00"), Some(expected));
        assert_eq!(date_from_iso("January"), None);
    }

    #[test]
    fn test_reading_time() {
        assert_eq!(reading_time(""), "1 minute");
        let text = "word ".repeat(201);
        assert_eq!(reading_time(&format!("<p>{}</p>", text)), "2 minutes");
    }

    #[test]
    fn test_humanize_duration() {
        assert_eq!(humanize_duration("PT1H30M").unwrap(), "1 hour, 30 minutes");
        assert_eq!(humanize_duration("P2DT1S").unwrap(), "2 days, 1 second");
        assert_eq!(humanize_duration("P1Y2M3W").unwrap(), "1 year, 2 months, 3 weeks");
        assert_eq!(humanize_duration("PT0,5H").unwrap(), "0.5 hours");
        assert_eq!(humanize_duration("PT0S").unwrap(), "0 seconds");
    }

    #[test]
    fn test_humanize_invalid_duration() {
        assert!(humanize_duration("P").is_err());
        assert!(humanize_duration("PT").is_err());
        assert!(humanize_duration("1 hour").is_err());
        assert_eq!(humanize_duration("PT1X").unwrap_err(), "Invalid ISO 8601 duration PT1X");
    }
}
