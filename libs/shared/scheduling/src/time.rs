use std::sync::OnceLock;

use regex::Regex;

use crate::{DEFAULT_SLOT_MINUTES, MINUTES_PER_DAY};

fn first_integer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid regex literal"))
}

/// Parses a time-of-day string into minutes since midnight.
///
/// Accepts `"HH:MM"`, `"HH:MM:SS"` and 12-hour forms like `"9:30 AM"` or
/// `"5 PM"`. Anything that is not a digit or a colon is stripped before
/// parsing, so stray whitespace and the AM/PM marker itself are tolerated.
pub fn parse_time_of_day(raw: &str) -> Option<u32> {
    let upper = raw.to_uppercase();
    let is_pm = upper.contains("PM");
    let is_am = upper.contains("AM");

    let cleaned: String = raw.chars().filter(|c| c.is_ascii_digit() || *c == ':').collect();
    if cleaned.is_empty() {
        return None;
    }

    let mut parts = cleaned.split(':');
    let mut hours: u32 = parts.next()?.parse().ok()?;
    let minutes: u32 = match parts.next() {
        Some(m) if !m.is_empty() => m.parse().ok()?,
        _ => 0,
    };

    if is_pm && hours != 12 {
        hours += 12;
    } else if is_am && hours == 12 {
        hours = 0;
    }

    if hours >= 24 || minutes >= 60 {
        return None;
    }

    Some(hours * 60 + minutes)
}

/// Extracts an appointment length in minutes from free-form text like
/// `"30 minutes"` or `"45 min"`. Missing or non-positive values fall back
/// to [`DEFAULT_SLOT_MINUTES`].
pub fn parse_duration_minutes(raw: &str) -> u32 {
    first_integer_re()
        .find(raw)
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_SLOT_MINUTES)
}

/// Formats minutes since midnight as zero-padded `"HH:MM"`, wrapping past
/// midnight so overnight slot ends render as next-day times.
pub fn format_minutes(minutes: u32) -> String {
    let wrapped = minutes % MINUTES_PER_DAY;
    format!("{:02}:{:02}", wrapped / 60, wrapped % 60)
}
