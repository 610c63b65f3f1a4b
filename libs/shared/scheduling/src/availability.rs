use serde::Serialize;
use uuid::Uuid;

use crate::slots::TimeSlot;
use crate::MINUTES_PER_DAY;

/// The single overlap predicate used by availability filtering and the
/// booking conflict guard alike. Intervals are half-open, so back-to-back
/// ranges do not overlap.
pub fn overlaps(a_start: u32, a_end: u32, b_start: u32, b_end: u32) -> bool {
    a_start < b_end && b_start < a_end
}

/// One occupied interval on a dentist's calendar for a given date.
///
/// Booked appointments carry the booking patient; provider blocks and
/// blocked-date rows carry `None`. Both occupy the calendar identically.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusyInterval {
    pub start_minutes: u32,
    pub end_minutes: u32,
    pub patient_id: Option<Uuid>,
}

impl BusyInterval {
    /// Builds an interval from clock minutes, wrapping a midnight end. A
    /// stored `23:00`-`00:00` row occupies `[1380, 1440)`.
    pub fn from_range(start_minutes: u32, end_minutes: u32, patient_id: Option<Uuid>) -> Self {
        Self {
            start_minutes,
            end_minutes: wrap_end(start_minutes, end_minutes),
            patient_id,
        }
    }
}

/// Wraps an end at or before its start past midnight. Rows that close a day
/// end at `00:00`, which reads as minute 1440 of the same date.
pub fn wrap_end(start_minutes: u32, end_minutes: u32) -> u32 {
    if end_minutes <= start_minutes {
        end_minutes + MINUTES_PER_DAY
    } else {
        end_minutes
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Available,
    Booked,
    UserBooked,
    Blocked,
}

/// Keeps the slots a patient could still book: no overlap with any busy
/// interval, and not already started when `now_minutes` is given (the
/// target date is today).
pub fn filter_available(
    slots: &[TimeSlot],
    busy: &[BusyInterval],
    now_minutes: Option<u32>,
) -> Vec<TimeSlot> {
    slots
        .iter()
        .filter(|slot| {
            if let Some(now) = now_minutes {
                if slot.start_minutes < now {
                    return false;
                }
            }
            !busy.iter().any(|b| {
                overlaps(slot.start_minutes, slot.end_minutes, b.start_minutes, b.end_minutes)
            })
        })
        .copied()
        .collect()
}

/// Classifies one slot for display. Past slots are reported as blocked
/// rather than omitted, so the day keeps its full shape. Among overlapping
/// busy intervals the viewer's own booking wins, then another patient's,
/// then a provider block.
pub fn classify(
    slot: &TimeSlot,
    busy: &[BusyInterval],
    viewer: Option<Uuid>,
    now_minutes: Option<u32>,
) -> SlotStatus {
    if let Some(now) = now_minutes {
        if slot.start_minutes < now {
            return SlotStatus::Blocked;
        }
    }

    let overlapping: Vec<&BusyInterval> = busy
        .iter()
        .filter(|b| overlaps(slot.start_minutes, slot.end_minutes, b.start_minutes, b.end_minutes))
        .collect();

    if overlapping.is_empty() {
        return SlotStatus::Available;
    }

    if let Some(viewer_id) = viewer {
        if overlapping.iter().any(|b| b.patient_id == Some(viewer_id)) {
            return SlotStatus::UserBooked;
        }
    }

    if overlapping.iter().any(|b| b.patient_id.is_some()) {
        SlotStatus::Booked
    } else {
        SlotStatus::Blocked
    }
}
