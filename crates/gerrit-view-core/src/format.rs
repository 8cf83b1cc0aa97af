//! Text formatting for table cells.

use chrono::{DateTime, TimeZone};
use std::fmt::Display;

/// Maximum cell length before truncation; 3 more chars go to the `...`.
pub const TRUNCATE_LEN: usize = 47;

/// Truncate `text` to [`TRUNCATE_LEN`] characters, appending `...` if cut.
pub fn truncate(text: &str) -> String {
    match text.char_indices().nth(TRUNCATE_LEN) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Cell text for an optional value: empty when absent.
pub fn cell(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

/// Format a Gerrit `createdOn` epoch timestamp, e.g. `02:40 PM 09/24/2013`.
///
/// Missing or zero timestamps render as an empty cell.
pub fn format_created_on<Tz>(secs: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    match secs.filter(|&s| s != 0).and_then(|s| DateTime::from_timestamp(s, 0)) {
        Some(utc) => utc.with_timezone(tz).format("%I:%M %p %m/%d/%Y").to_string(),
        None => String::new(),
    }
}

/// Format a wall-clock instant for the dashboard footer.
pub fn format_clock<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    now.format("%I:%M:%S %p %m/%d/%Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate("short"), "short");
        let exact = "x".repeat(TRUNCATE_LEN);
        assert_eq!(truncate(&exact), exact);
    }

    #[test]
    fn test_truncate_long_text() {
        let long = "y".repeat(TRUNCATE_LEN + 1);
        let out = truncate(&long);
        assert_eq!(out.len(), TRUNCATE_LEN + 3);
        assert!(out.ends_with("y..."));
    }

    #[test]
    fn test_truncate_multibyte() {
        let long = "é".repeat(60);
        let out = truncate(&long);
        assert_eq!(out.chars().count(), TRUNCATE_LEN + 3);
    }

    #[test]
    fn test_created_on() {
        assert_eq!(
            format_created_on(Some(1_380_000_000), &Utc),
            "05:20 AM 09/24/2013"
        );
        assert_eq!(format_created_on(None, &Utc), "");
        assert_eq!(format_created_on(Some(0), &Utc), "");
    }

    #[test]
    fn test_clock() {
        let t = Utc.timestamp_opt(1_380_000_000, 0).unwrap();
        assert_eq!(format_clock(&t), "05:20:00 AM 09/24/2013");
    }
}
