//! Pure scheduling core: time-of-day normalization, slot generation,
//! working-day checks and availability classification.
//!
//! Everything in this crate is synchronous and side-effect free. Callers
//! normalize raw record fields (work hours, durations, busy rows) into the
//! typed values here and get back generated/classified slots. Every booking
//! surface goes through this one implementation, including the server-side
//! conflict guard.

pub mod availability;
pub mod slots;
pub mod time;
pub mod workday;

pub use availability::{classify, filter_available, overlaps, wrap_end, BusyInterval, SlotStatus};
pub use slots::{generate_slots, TimeSlot, WorkingHours};
pub use time::{format_minutes, parse_duration_minutes, parse_time_of_day};
pub use workday::{is_working_day, parse_weekday};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

/// Fallback appointment length when a dentist record carries no parsable
/// duration.
pub const DEFAULT_SLOT_MINUTES: u32 = 30;
