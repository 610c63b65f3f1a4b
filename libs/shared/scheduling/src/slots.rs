use chrono::Weekday;
use serde::{Deserialize, Serialize};

use crate::time::format_minutes;
use crate::MINUTES_PER_DAY;

/// A dentist's normalized working pattern, parsed from the textual fields of
/// the dentist record (`work_time_from`, `work_days_from`, ...).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingHours {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub days_from: Weekday,
    pub days_to: Weekday,
    pub slot_minutes: u32,
}

/// One bookable interval within a working day, in raw minutes since the
/// working day's midnight. For overnight windows the end (and even the
/// start of later slots) may exceed 24h; labels wrap via [`format_minutes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start_minutes: u32,
    pub end_minutes: u32,
}

impl TimeSlot {
    pub fn label_from(&self) -> String {
        format_minutes(self.start_minutes)
    }

    pub fn label_to(&self) -> String {
        format_minutes(self.end_minutes)
    }
}

/// Tiles the working window with fixed-length slots.
///
/// A window whose end is at or before its start wraps to the next day.
/// Slots are emitted while a whole slot still fits, so the tiling is
/// contiguous, non-overlapping and maximal. Pure: same input, same output.
pub fn generate_slots(hours: &WorkingHours) -> Vec<TimeSlot> {
    let start = hours.start_minutes;
    let mut end = hours.end_minutes;
    if end <= start {
        end += MINUTES_PER_DAY;
    }

    let duration = hours.slot_minutes.max(1);

    let mut slots = Vec::new();
    let mut current = start;
    while current + duration <= end {
        slots.push(TimeSlot {
            start_minutes: current,
            end_minutes: current + duration,
        });
        current += duration;
    }

    slots
}
