// Parsing and formatting helpers shared across the pipeline.
//
// This module centralizes the "dirty" CSV value handling so the rest of
// the code can assume clean, typed values.
use chrono::{NaiveDateTime, NaiveTime};
use num_format::{Locale, ToFormattedString};

/// Parse an outcome cell into `i64` while being forgiving about formatting
/// issues common in CSV exports.
///
/// - Accepts `Option<&str>` so callers can pass through optional fields.
/// - Trims whitespace.
/// - Accepts values exported as floats (`"1.0"`) as long as they are whole.
/// - Returns `None` for anything that cannot be safely parsed.
pub fn parse_i64_safe(s: Option<&str>) -> Option<i64> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(n) = s.parse::<i64>() {
        return Some(n);
    }
    match s.parse::<f64>() {
        Ok(f) if f.fract() == 0.0 => Some(f as i64),
        _ => None,
    }
}

/// Ticket timestamps are exported as e.g. `03 Jan 2024 11:42 AM`.
pub fn parse_ticket_time(s: Option<&str>) -> Option<NaiveDateTime> {
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%d %b %Y %I:%M %p").ok()
}

/// 12-hour clock rendering used for schedule cells, e.g. `09:00 AM`.
pub fn fmt_clock(t: NaiveTime) -> String {
    t.format("%I:%M %p").to_string()
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Thin wrapper around `num-format` for integer-like values, used for
    // row counts in console messages (e.g., `9,855 rows loaded`).
    n.to_formatted_string(&Locale::en)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_plain_and_float_integers() {
        assert_eq!(parse_i64_safe(Some("2")), Some(2));
        assert_eq!(parse_i64_safe(Some(" 1 ")), Some(1));
        assert_eq!(parse_i64_safe(Some("1.0")), Some(1));
        assert_eq!(parse_i64_safe(Some("1.5")), None);
        assert_eq!(parse_i64_safe(Some("abc")), None);
        assert_eq!(parse_i64_safe(Some("")), None);
        assert_eq!(parse_i64_safe(None), None);
    }

    #[test]
    fn parses_ticket_timestamps() {
        let t = parse_ticket_time(Some("03 Jan 2024 11:42 AM")).unwrap();
        assert_eq!(t.hour(), 11);
        assert_eq!(t.minute(), 42);
        let pm = parse_ticket_time(Some("03 Jan 2024 01:05 PM")).unwrap();
        assert_eq!(pm.hour(), 13);
        assert_eq!(parse_ticket_time(Some("2024-01-03 11:42")), None);
    }

    #[test]
    fn clock_format_is_twelve_hour() {
        let t = NaiveTime::from_hms_opt(22, 0, 0).unwrap();
        assert_eq!(fmt_clock(t), "10:00 PM");
        let t = NaiveTime::from_hms_opt(9, 15, 0).unwrap();
        assert_eq!(fmt_clock(t), "09:15 AM");
    }
}
