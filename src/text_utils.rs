use std::ops::Index;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

fn to_int<T: std::str::FromStr>(num_str: &str, date_str: &str) -> Result<T, String> {
    match num_str.parse::<T>() {
        Ok(x) => Ok(x),
        Err(_) => Err(format!("Error parsing {} from the date {}", num_str, date_str)),
    }
}

/// Accepts `2022-04-02`, `2022-04-02 12:05:00.000` and `2022-04-02T12:05:00Z`.
/// Dates without an offset are UTC.
pub fn parse_date_time(buf: &str) -> Result<DateTime<Utc>, String> {
    lazy_static! {
        static ref DATE_REGEX: Regex = Regex::new(
            r"^(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{1,2})(?::(\d{1,2}))?(?:\.\d{1,9})?)?(Z|[+-]\d{2}:\d{2})?$"
        ).unwrap();
    }

    let buf = buf.trim();
    if let Ok(date_time) = DateTime::parse_from_rfc3339(buf) {
        return Ok(date_time.with_timezone(&Utc));
    }

    let Some(caps) = DATE_REGEX.captures(buf) else {
        return Err(format!("Unable to parse date time {}", buf));
    };
    if let Some(offset) = caps.get(7) {
        if offset.as_str() != "Z" {
            return Err(format!("Unable to parse date time {}", buf));
        }
    }

    let to_i32 = |num_str: &str| to_int::<i32>(num_str, buf);
    let to_u32 = |num_str: &str| to_int::<u32>(num_str, buf);
    let opt_u32 = |idx: usize| caps.get(idx).map_or(Ok(0), |m| to_u32(m.as_str()));

    let y: i32 = to_i32(caps.index(1))?;
    let m: u32 = to_u32(caps.index(2))?;
    let d: u32 = to_u32(caps.index(3))?;
    let h: u32 = opt_u32(4)?;
    let mn: u32 = opt_u32(5)?;
    let s: u32 = opt_u32(6)?;

    let date = NaiveDate::from_ymd_opt(y, m, d)
        .ok_or_else(|| format!("Invalid date {}", buf))?;
    let time = NaiveTime::from_hms_opt(h, mn, s)
        .ok_or_else(|| format!("Invalid time {}", buf))?;

    Ok(NaiveDateTime::new(date, time).and_utc())
}

pub fn format_date_time(date_time: &DateTime<Utc>) -> (String, String) {
    let date = date_time.format("%Y-%m-%d").to_string();
    let time = date_time.format("%H:%M:%S").to_string();
    (date, time)
}

/// Lowercase ASCII, words joined by `-`. Used for heading ids and tag urls.
pub fn slugify(text: &str) -> String {
    let ascii = unidecode::unidecode(text);
    let mut slug = String::with_capacity(ascii.len());
    let mut pending_dash = false;

    for c in ascii.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else if c.is_whitespace() || c == '-' || c == '_' {
            pending_dash = true;
        }
    }

    slug
}

pub fn strip_html(html: &str) -> String {
    lazy_static! {
        static ref TAG_REGEX: Regex = Regex::new(r"<[^>]+>|&[#\w]+;").unwrap();
    }
    TAG_REGEX.replace_all(html, "").to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_parse_date_time() {
        let date_time = parse_date_time("2017-09-10 10:42:32.123").unwrap();
        let (date, time) = format_date_time(&date_time);
        assert_eq!(date, "2017-09-10");
        assert_eq!(time, "10:42:32");

        let date_time = parse_date_time("2017-09-10 10:42:32").unwrap();
        assert_eq!(date_time, Utc.with_ymd_and_hms(2017, 9, 10, 10, 42, 32).unwrap());

        let date_time = parse_date_time("2017-09-10").unwrap();
        assert_eq!(date_time, Utc.with_ymd_and_hms(2017, 9, 10, 0, 0, 0).unwrap());

        let date_time = parse_date_time("2017-09-10T10:42").unwrap();
        assert_eq!(date_time, Utc.with_ymd_and_hms(2017, 9, 10, 10, 42, 0).unwrap());
    }

    #[test]
    fn test_parse_date_time_with_offset() {
        let date_time = parse_date_time("2017-09-10T10:42:32+02:00").unwrap();
        assert_eq!(date_time, Utc.with_ymd_and_hms(2017, 9, 10, 8, 42, 32).unwrap());

        let date_time = parse_date_time("2017-09-10T10:42:32Z").unwrap();
        assert_eq!(date_time, Utc.with_ymd_and_hms(2017, 9, 10, 10, 42, 32).unwrap());
    }

    #[test]
    fn test_parse_invalid_date_time() {
        assert!(parse_date_time("yesterday").is_err());
        assert!(parse_date_time("2017-13-10").is_err());
        assert!(parse_date_time("2017-02-10 25:00").is_err());
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Non technical"), "non-technical");
        assert_eq!(slugify("  Python 3.12: what's new?  "), "python-312-whats-new");
        assert_eq!(slugify("Ábaco -- dir_2"), "abaco-dir-2");
        assert_eq!(slugify("C++"), "c");
    }

    #[test]
    fn test_strip_html() {
        assert_eq!(strip_html("<code>pip</code> &amp; friends"), "pip  friends");
    }
}
