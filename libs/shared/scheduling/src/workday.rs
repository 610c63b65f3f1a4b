use chrono::{Datelike, NaiveDate, Weekday};

/// Parses the textual day-name fields of a dentist record.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    match raw.trim().to_lowercase().as_str() {
        "monday" | "mon" => Some(Weekday::Mon),
        "tuesday" | "tue" => Some(Weekday::Tue),
        "wednesday" | "wed" => Some(Weekday::Wed),
        "thursday" | "thu" => Some(Weekday::Thu),
        "friday" | "fri" => Some(Weekday::Fri),
        "saturday" | "sat" => Some(Weekday::Sat),
        "sunday" | "sun" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Whether `date` falls inside the dentist's working-day range.
///
/// Days are ordered Monday-first. A range whose `from` is later in the week
/// than its `to` wraps around the weekend: Saturday..Monday covers Saturday,
/// Sunday and Monday only.
pub fn is_working_day(date: NaiveDate, days_from: Weekday, days_to: Weekday) -> bool {
    let day = date.weekday().num_days_from_monday();
    let from = days_from.num_days_from_monday();
    let to = days_to.num_days_from_monday();

    if from <= to {
        day >= from && day <= to
    } else {
        day >= from || day <= to
    }
}
