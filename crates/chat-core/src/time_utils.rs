use std::sync::OnceLock;

use chrono::{Month, NaiveDateTime, Weekday};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AnalyzerError, Result};

// ── TimestampFormat ───────────────────────────────────────────────────────────

/// The date-time encodings found in exported transcript headers.
///
/// All of them are day-first with a two-digit year. Variants are declared in
/// the order they must be tried: a 12-hour text never parses as 24-hour and
/// vice versa, but keeping the order fixed makes ambiguous inputs resolve the
/// same way every time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampFormat {
    /// `01/01/23, 9:05 AM`
    Minutes12h,
    /// `01/01/23, 21:05`
    Minutes24h,
    /// `01/01/23, 09:05:00 AM`
    Seconds12h,
    /// `01/01/23, 21:05:00`
    Seconds24h,
}

impl TimestampFormat {
    /// Every format in priority order.
    pub const ALL: [TimestampFormat; 4] = [
        TimestampFormat::Minutes12h,
        TimestampFormat::Minutes24h,
        TimestampFormat::Seconds12h,
        TimestampFormat::Seconds24h,
    ];

    /// The `strftime` pattern for this format.
    pub fn pattern(self) -> &'static str {
        match self {
            TimestampFormat::Minutes12h => "%d/%m/%y, %I:%M %p",
            TimestampFormat::Minutes24h => "%d/%m/%y, %H:%M",
            TimestampFormat::Seconds12h => "%d/%m/%y, %I:%M:%S %p",
            TimestampFormat::Seconds24h => "%d/%m/%y, %H:%M:%S",
        }
    }

    /// Parse already-normalised `text` under this format only.
    pub fn parse(self, text: &str) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(text, self.pattern()).ok()
    }
}

// ── Parsing ───────────────────────────────────────────────────────────────────

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("regex is valid"))
}

/// Collapse every run of Unicode whitespace (including the narrow no-break
/// space some exporters put before `AM`/`PM`) into one ASCII space.
pub fn normalize_timestamp_text(text: &str) -> String {
    whitespace_run().replace_all(text.trim(), " ").into_owned()
}

/// Parse a header timestamp, trying each [`TimestampFormat`] in order.
pub fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    let normalised = normalize_timestamp_text(text);
    TimestampFormat::ALL
        .iter()
        .find_map(|fmt| fmt.parse(&normalised))
        .ok_or_else(|| AnalyzerError::TimestampParse(text.to_string()))
}

/// Find the first format under which *every* text parses.
///
/// Returns `None` for an empty batch or when no single format covers the
/// whole batch; callers then fall back to [`parse_timestamp`] per text.
pub fn detect_batch_format<S: AsRef<str>>(texts: &[S]) -> Option<TimestampFormat> {
    if texts.is_empty() {
        return None;
    }

    let found = TimestampFormat::ALL.into_iter().find(|fmt| {
        texts
            .iter()
            .all(|t| fmt.parse(&normalize_timestamp_text(t.as_ref())).is_some())
    });

    if found.is_none() {
        debug!(
            "No single timestamp format covers all {} headers; parsing individually",
            texts.len()
        );
    }
    found
}

// ── Calendar names ────────────────────────────────────────────────────────────

/// English name of `month` (1–12). Out-of-range values yield `"Unknown"`.
pub fn month_name(month: u32) -> &'static str {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name())
        .unwrap_or("Unknown")
}

/// English name of `weekday`.
pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    // ── parse_timestamp ───────────────────────────────────────────────────────

    #[test]
    fn test_parse_12h_minutes() {
        let dt = parse_timestamp("01/02/23, 9:05 PM").unwrap();
        assert_eq!(dt.year(), 2023);
        assert_eq!(dt.month(), 2);
        assert_eq!(dt.day(), 1);
        assert_eq!(dt.hour(), 21);
        assert_eq!(dt.minute(), 5);
    }

    #[test]
    fn test_parse_24h_minutes() {
        let dt = parse_timestamp("15/08/22, 14:30").unwrap();
        assert_eq!(dt.month(), 8);
        assert_eq!(dt.day(), 15);
        assert_eq!(dt.hour(), 14);
    }

    #[test]
    fn test_parse_12h_seconds() {
        let dt = parse_timestamp("31/12/21, 11:59:58 PM").unwrap();
        assert_eq!(dt.year(), 2021);
        assert_eq!(dt.hour(), 23);
        assert_eq!(dt.second(), 58);
    }

    #[test]
    fn test_parse_24h_seconds() {
        let dt = parse_timestamp("01/01/23, 14:30:00").unwrap();
        assert_eq!(dt.hour(), 14);
        assert_eq!(dt.minute(), 30);
    }

    #[test]
    fn test_parse_lowercase_meridiem() {
        let dt = parse_timestamp("01/01/23, 12:15 am").unwrap();
        assert_eq!(dt.hour(), 0);
    }

    #[test]
    fn test_parse_narrow_no_break_space() {
        let dt = parse_timestamp("01/01/23, 10:00\u{202F}AM").unwrap();
        assert_eq!(dt.hour(), 10);
    }

    #[test]
    fn test_parse_invalid_date_rejected() {
        let err = parse_timestamp("31/02/23, 10:00").unwrap_err();
        assert!(matches!(err, AnalyzerError::TimestampParse(_)));
    }

    #[test]
    fn test_parse_garbage_rejected() {
        assert!(parse_timestamp("yesterday").is_err());
        assert!(parse_timestamp("").is_err());
    }

    // ── detect_batch_format ───────────────────────────────────────────────────

    #[test]
    fn test_batch_format_uniform() {
        let texts = ["01/01/23, 10:00", "02/01/23, 18:45"];
        assert_eq!(
            detect_batch_format(&texts),
            Some(TimestampFormat::Minutes24h)
        );
    }

    #[test]
    fn test_batch_format_prefers_12h() {
        let texts = ["01/01/23, 10:00 AM", "01/01/23, 1:00 PM"];
        assert_eq!(
            detect_batch_format(&texts),
            Some(TimestampFormat::Minutes12h)
        );
    }

    #[test]
    fn test_batch_format_mixed_is_none() {
        let texts = ["01/01/23, 10:00 AM", "01/01/23, 14:00"];
        assert_eq!(detect_batch_format(&texts), None);
    }

    #[test]
    fn test_batch_format_empty_is_none() {
        let texts: [&str; 0] = [];
        assert_eq!(detect_batch_format(&texts), None);
    }

    // ── names ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(0), "Unknown");
        assert_eq!(month_name(13), "Unknown");
    }

    #[test]
    fn test_weekday_name() {
        assert_eq!(weekday_name(Weekday::Mon), "Monday");
        assert_eq!(weekday_name(Weekday::Sun), "Sunday");
    }
}
