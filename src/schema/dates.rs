//! Date, datetime and time parsing tables.
//!
//! The `any` format does not guess: it walks [`ANY_DATE_LAYOUTS`] in order and
//! keeps the first layout that yields a valid calendar date. Day-before-month
//! comes ahead of month-before-day, so `01/12/2016` is the 1st of December while
//! `07/29/2016` still parses because the 29th month does not exist.

use std::sync::OnceLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

/// One position of a three-part date
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    /// Four digits only, used where the year leads
    FullYear,
    /// Four digits, or two digits around the pivot
    Year,
    Month,
    MonthName,
    Day,
}

/// Layouts accepted by the `any` format, tried in order
const ANY_DATE_LAYOUTS: [[Slot; 3]; 6] = [
    [Slot::FullYear, Slot::Month, Slot::Day],
    [Slot::Day, Slot::Month, Slot::Year],
    [Slot::Month, Slot::Day, Slot::Year],
    [Slot::Day, Slot::MonthName, Slot::Year],
    [Slot::MonthName, Slot::Day, Slot::Year],
    [Slot::FullYear, Slot::MonthName, Slot::Day],
];

/// Time-of-day layouts accepted by the `any` format, tried in order
const ANY_TIME_PATTERNS: [&str; 8] = [
    "%H:%M:%S%.f",
    "%H:%M:%S",
    "%H:%M",
    "%I:%M:%S %p",
    "%I:%M %p",
    "%I:%M:%S%p",
    "%I:%M%p",
    "%H%M%S",
];

const MONTH_NAMES: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Two-digit years below this pivot land in the 2000s, the rest in the 1900s
const TWO_DIGIT_YEAR_PIVOT: i32 = 69;

fn iso_date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("static ISO date regex"))
}

fn iso_datetime_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?(Z|[+-]\d{2}:\d{2})?$")
            .expect("static ISO datetime regex")
    })
}

fn iso_time_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{2}:\d{2}:\d{2}$").expect("static ISO time regex"))
}

/// Strict `YYYY-MM-DD`
pub fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    if !iso_date_re().is_match(s) {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Strict `YYYY-MM-DDTHH:MM:SS[.fff][Z|±hh:mm]`; offsets are normalised to UTC
pub fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if !iso_datetime_re().is_match(s) {
        return None;
    }
    if s.ends_with('Z') || (s.len() > 19 && s[19..].contains(['+', '-'])) {
        return DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f").ok()
}

/// Strict `HH:MM:SS`
pub fn parse_iso_time(s: &str) -> Option<NaiveTime> {
    if !iso_time_re().is_match(s) {
        return None;
    }
    NaiveTime::parse_from_str(s, "%H:%M:%S").ok()
}

/// Best-effort date parse; any time-of-day suffix is ignored
pub fn parse_any_date(s: &str) -> Option<NaiveDate> {
    let (date, _) = split_time_suffix(s.trim());
    parse_date_tokens(date)
}

/// Best-effort datetime parse; a missing time means midnight
pub fn parse_any_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    let (date, time) = split_time_suffix(s);
    let date = parse_date_tokens(date)?;
    let time = match time {
        Some(t) => parse_any_time(t)?,
        None => NaiveTime::from_hms_opt(0, 0, 0)?,
    };
    Some(date.and_time(time))
}

/// Best-effort time-of-day parse; a trailing `Z` or UTC offset is dropped
pub fn parse_any_time(s: &str) -> Option<NaiveTime> {
    let s = strip_offset(s.trim());
    ANY_TIME_PATTERNS
        .iter()
        .find_map(|pattern| NaiveTime::parse_from_str(s, pattern).ok())
}

/// Parse with a user supplied strftime pattern (`fmt:<pattern>`)
pub fn parse_date_with(s: &str, pattern: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), pattern).ok()
}

/// Datetime counterpart of [`parse_date_with`]
pub fn parse_datetime_with(s: &str, pattern: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s.trim(), pattern).ok()
}

/// Time counterpart of [`parse_date_with`]
pub fn parse_time_with(s: &str, pattern: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), pattern).ok()
}

/// Split `"<date> <time>"` or `"<date>T<time>"` at the separator preceding the first `:`
fn split_time_suffix(s: &str) -> (&str, Option<&str>) {
    let Some(colon) = s.find(':') else {
        return (s, None);
    };
    match s[..colon].rfind([' ', 'T']) {
        Some(cut) => (s[..cut].trim_end(), Some(s[cut + 1..].trim())),
        None => (s, None),
    }
}

fn strip_offset(s: &str) -> &str {
    if let Some(stripped) = s.strip_suffix('Z') {
        return stripped;
    }
    // "+hh:mm" / "-hh:mm" trailing a time
    if s.len() > 6 && s.is_char_boundary(s.len() - 6) {
        let (head, tail) = s.split_at(s.len() - 6);
        let bytes = tail.as_bytes();
        if (bytes[0] == b'+' || bytes[0] == b'-') && bytes[3] == b':' && head.contains(':') {
            return head;
        }
    }
    s
}

fn parse_date_tokens(s: &str) -> Option<NaiveDate> {
    let mut tokens: Vec<&str> = s
        .split(['-', '/', '.', ' ', ','])
        .filter(|t| !t.is_empty())
        .collect();
    // "Sat 29 Jul 2016": the weekday is redundant
    if tokens.len() == 4 && is_weekday_name(tokens[0]) {
        tokens.remove(0);
    }

    match tokens.as_slice() {
        [compact] if compact.len() == 8 && is_digits(compact) => {
            let year = compact[0..4].parse().ok()?;
            let month = compact[4..6].parse().ok()?;
            let day = compact[6..8].parse().ok()?;
            NaiveDate::from_ymd_opt(year, month, day)
        }
        [a, b, c] => ANY_DATE_LAYOUTS
            .iter()
            .find_map(|layout| apply_layout(layout, [*a, *b, *c])),
        _ => None,
    }
}

fn apply_layout(layout: &[Slot; 3], tokens: [&str; 3]) -> Option<NaiveDate> {
    let mut year = None;
    let mut month = None;
    let mut day = None;
    for (slot, token) in layout.iter().zip(tokens) {
        match slot {
            Slot::FullYear if token.len() != 4 => return None,
            Slot::FullYear | Slot::Year => year = Some(read_year(token)?),
            Slot::Month => month = Some(read_small_number(token)?),
            Slot::MonthName => month = Some(read_month_name(token)?),
            Slot::Day => day = Some(read_small_number(token)?),
        }
    }
    NaiveDate::from_ymd_opt(year?, month?, day?)
}

fn read_year(token: &str) -> Option<i32> {
    if !is_digits(token) {
        return None;
    }
    let value: i32 = token.parse().ok()?;
    match token.len() {
        4 => Some(value),
        2 if value < TWO_DIGIT_YEAR_PIVOT => Some(2000 + value),
        2 => Some(1900 + value),
        _ => None,
    }
}

fn read_small_number(token: &str) -> Option<u32> {
    if token.is_empty() || token.len() > 2 || !is_digits(token) {
        return None;
    }
    token.parse().ok()
}

fn read_month_name(token: &str) -> Option<u32> {
    let lower = token.to_lowercase();
    if lower.len() < 3 {
        return None;
    }
    if lower == "sept" {
        return Some(9);
    }
    MONTH_NAMES
        .iter()
        .position(|name| *name == lower || (lower.len() == 3 && name.starts_with(&lower)))
        .map(|i| i as u32 + 1)
}

fn is_weekday_name(token: &str) -> bool {
    let lower = token.to_lowercase();
    lower.len() >= 3 && WEEKDAY_NAMES.iter().any(|name| name.starts_with(&lower))
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_any_date_accepts_survey_formats() {
        let expected = ymd(2016, 7, 29);
        for value in [
            "2016-07-29",
            "07/29/2016",
            "07/29/16",
            "2016-07-29 15:28:37",
            "2016-07-29T15:28:37Z",
            "29/07/2016",
            "29-July-2016",
            "29-JUlY-16",
            "29-07-2016",
            "29-07-16",
            "29.07.2016",
            "29 Jul 2016",
            "July 29, 2016",
            "20160729",
        ] {
            assert_eq!(parse_any_date(value), Some(expected), "{}", value);
        }
    }

    #[test]
    fn test_any_date_skips_leading_weekday() {
        let expected = ymd(2016, 7, 29);
        for value in [
            "Sat 29 Jul 2016",
            "Saturday, 29 July 2016",
            "fri 29/07/2016",
            "Thurs July 29, 2016",
        ] {
            assert_eq!(parse_any_date(value), Some(expected), "{}", value);
        }
        assert_eq!(parse_any_date("Xyz 29 Jul 2016"), None);
        assert_eq!(parse_any_date("Sat Jul 2016"), None);
    }

    #[test]
    fn test_any_date_is_day_first() {
        assert_eq!(parse_any_date("01/12/2016"), Some(ymd(2016, 12, 1)));
        assert_eq!(parse_any_date("23/12/2016"), Some(ymd(2016, 12, 23)));
        assert_eq!(parse_any_date("12/01/2016"), Some(ymd(2016, 1, 12)));
    }

    #[test]
    fn test_any_date_rejects_garbage() {
        for value in ["djskdj", "bullshit", "", "31/31/2016", "2016-13", "15:28:37", "1200"] {
            assert_eq!(parse_any_date(value), None, "{}", value);
        }
    }

    #[test]
    fn test_two_digit_year_pivot() {
        assert_eq!(parse_any_date("01/01/68"), Some(ymd(2068, 1, 1)));
        assert_eq!(parse_any_date("01/01/69"), Some(ymd(1969, 1, 1)));
    }

    #[test]
    fn test_iso_date_is_strict() {
        assert_eq!(parse_iso_date("2016-07-29"), Some(ymd(2016, 7, 29)));
        assert_eq!(parse_iso_date("07/29/2016"), None);
        assert_eq!(parse_iso_date("29/07/2016"), None);
        assert_eq!(parse_iso_date("2016-07-29 15:28:37"), None);
        assert_eq!(parse_iso_date("16-07-29"), None);
        assert_eq!(parse_iso_date("2016-02-30"), None);
    }

    #[test]
    fn test_iso_datetime() {
        let dt = parse_iso_datetime("2016-07-29T15:28:37Z").unwrap();
        assert_eq!(dt, ymd(2016, 7, 29).and_hms_opt(15, 28, 37).unwrap());
        let dt = parse_iso_datetime("2016-07-29T15:28:37+08:00").unwrap();
        assert_eq!(dt, ymd(2016, 7, 29).and_hms_opt(7, 28, 37).unwrap());
        assert!(parse_iso_datetime("2016-07-29 15:28:37").is_none());
    }

    #[test]
    fn test_any_datetime_and_time() {
        let dt = parse_any_datetime("29/07/2016 3:28 PM").unwrap();
        assert_eq!(dt, ymd(2016, 7, 29).and_hms_opt(15, 28, 0).unwrap());
        let dt = parse_any_datetime("29/07/2016").unwrap();
        assert_eq!(dt, ymd(2016, 7, 29).and_hms_opt(0, 0, 0).unwrap());
        assert_eq!(
            parse_any_time("15:28:37Z"),
            NaiveTime::from_hms_opt(15, 28, 37)
        );
        assert_eq!(parse_iso_time("15:28:37"), NaiveTime::from_hms_opt(15, 28, 37));
        assert_eq!(parse_iso_time("3:28 PM"), None);
    }

    #[test]
    fn test_custom_pattern() {
        assert_eq!(parse_date_with("30 Nov 14", "%d %b %y"), Some(ymd(2014, 11, 30)));
        assert_eq!(parse_date_with("2014-11-30", "%d %b %y"), None);
    }
}
