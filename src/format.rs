//! Display formatting for phone numbers, money and timestamps.
//!
//! All functions are pure and never fail: malformed input degrades to a
//! passthrough (phones) or is rejected explicitly (`parse_timestamp`) so the
//! caller decides on the fallback.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Timestamp layouts used on the two documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampPattern {
    /// `October 18, 2026 at 03:05 PM` – customer receipt header.
    LongDate,
    /// `03:05 PM` – kitchen ticket header.
    TimeOfDay,
    /// `03:05:09 PM` – kitchen ticket print line.
    PrintTime,
}

impl TimestampPattern {
    fn strftime(self) -> &'static str {
        match self {
            TimestampPattern::LongDate => "%B %d, %Y at %I:%M %p",
            TimestampPattern::TimeOfDay => "%I:%M %p",
            TimestampPattern::PrintTime => "%I:%M:%S %p",
        }
    }
}

/// Format a North American phone number.
///
/// Ten digits become `(AAA) BBB-CCCC`, eleven digits with a leading `1`
/// become `+1 (AAA) BBB-CCCC`. Anything else is returned unchanged.
pub fn format_phone(raw: &str) -> String {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    match digits.len() {
        10 => format!("({}) {}-{}", &digits[0..3], &digits[3..6], &digits[6..]),
        11 if digits.starts_with('1') => {
            format!("+1 ({}) {}-{}", &digits[1..4], &digits[4..7], &digits[7..])
        }
        _ => raw.to_string(),
    }
}

/// `$` prefix, two decimals. Negative amounts render as `-$X.YY`.
pub fn format_currency(amount: f64) -> String {
    let cents = (amount * 100.0).round();
    if cents < 0.0 {
        format!("-${:.2}", -cents / 100.0)
    } else {
        // `+ 0.0` folds a negative zero into positive zero.
        format!("${:.2}", cents / 100.0 + 0.0)
    }
}

/// Render `instant` with one of the fixed document patterns.
pub fn format_timestamp(instant: &NaiveDateTime, pattern: TimestampPattern) -> String {
    instant.format(pattern.strftime()).to_string()
}

/// Parse an ISO-8601 order timestamp.
///
/// Offsets are honoured by keeping the wall-clock time in that offset; the
/// documents never convert between zones.
pub fn parse_timestamp(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.naive_local());
    }
    const NAIVE: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];
    for layout in NAIVE {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}
