use chrono::NaiveDateTime;

/// Placeholder shown for dates of an empty selection.
pub const NOT_AVAILABLE: &str = "N/A";

/// Format a count with thousands separators.
///
/// # Examples
///
/// ```
/// use chat_core::formatting::format_count;
///
/// assert_eq!(format_count(0), "0");
/// assert_eq!(format_count(1234), "1,234");
/// assert_eq!(format_count(1234567), "1,234,567");
/// ```
pub fn format_count(value: u64) -> String {
    group_thousands(&value.to_string())
}

/// Format a calendar date as `YYYY-MM-DD`, or [`NOT_AVAILABLE`] when absent.
///
/// # Examples
///
/// ```
/// use chat_core::formatting::format_date;
/// use chrono::NaiveDate;
///
/// let dt = NaiveDate::from_ymd_opt(2023, 1, 5).unwrap().and_hms_opt(9, 0, 0).unwrap();
/// assert_eq!(format_date(Some(dt)), "2023-01-05");
/// assert_eq!(format_date(None), "N/A");
/// ```
pub fn format_date(value: Option<NaiveDateTime>) -> String {
    value
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Format a response delay given in minutes.
///
/// * `< 1` minute → `"<1m"`
/// * `< 60` minutes → `"45m"`
/// * `≥ 60` minutes → `"3h"` or `"3h 45m"`
/// * `≥ 24` hours → `"2d 3h"`
///
/// # Examples
///
/// ```
/// use chat_core::formatting::format_minutes;
///
/// assert_eq!(format_minutes(0.5), "<1m");
/// assert_eq!(format_minutes(45.0), "45m");
/// assert_eq!(format_minutes(225.0), "3h 45m");
/// assert_eq!(format_minutes(3060.0), "2d 3h");
/// ```
pub fn format_minutes(minutes: f64) -> String {
    if minutes < 1.0 {
        return "<1m".to_string();
    }
    let total_mins = minutes.round() as i64;
    if total_mins < 60 {
        return format!("{}m", total_mins);
    }
    let hours = total_mins / 60;
    let mins = total_mins % 60;
    if hours >= 24 {
        let days = hours / 24;
        let rem_hours = hours % 24;
        return if rem_hours == 0 {
            format!("{}d", days)
        } else {
            format!("{}d {}h", days, rem_hours)
        };
    }
    if mins == 0 {
        format!("{}h", hours)
    } else {
        format!("{}h {}m", hours, mins)
    }
}

/// Calculate `(part / whole) * 100`, rounded to `decimal_places`.
///
/// Returns `0.0` if `whole` is zero.
///
/// # Examples
///
/// ```
/// use chat_core::formatting::percentage;
///
/// assert!((percentage(50, 200, 1) - 25.0).abs() < 1e-9);
/// assert_eq!(percentage(0, 0, 2), 0.0);
/// ```
pub fn percentage(part: u64, whole: u64, decimal_places: u32) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    let raw = (part as f64 / whole as f64) * 100.0;
    let factor = 10_f64.powi(decimal_places as i32);
    (raw * factor).round() / factor
}

// ── Internal helpers ──────────────────────────────────────────────────────────

/// Insert commas every three digits from the right of an integer string.
fn group_thousands(s: &str) -> String {
    if s.len() <= 3 {
        return s.to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    let remainder = chars.len() % 3;
    for (i, &c) in chars.iter().enumerate() {
        if i != 0 && (i % 3 == remainder) {
            result.push(',');
        }
        result.push(c);
    }
    result
}

// ── Tests ──────────────────────────────────────────────────────────────────────
