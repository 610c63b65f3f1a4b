use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum AppointmentError {
    #[error("Appointment not found: {0}")]
    NotFound(Uuid),

    #[error("Dentist not found: {0}")]
    DentistNotFound(Uuid),

    #[error("Patient not found: {0}")]
    PatientNotFound(Uuid),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Slot conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Cancelled appointments stop occupying the calendar; every other
    /// status keeps its interval busy.
    pub fn occupies_calendar(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

/// An appointment row. A `None` patient is a provider-initiated block that
/// occupies the calendar without a booking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub appointment_id: Uuid,
    pub dentist_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_from: NaiveTime,
    pub time_to: NaiveTime,
    pub status: AppointmentStatus,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// Booking request. Times arrive as strings in any supported form
/// (`"HH:MM"`, `"HH:MM:SS"`, `"H:MM AM/PM"`) and are normalized before any
/// arithmetic.
#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub dentist_id: Uuid,
    pub patient_id: Option<Uuid>,
    pub date: NaiveDate,
    pub time_from: String,
    pub time_to: String,
    pub note: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConflictCheck {
    pub has_conflict: bool,
    pub conflicting_appointments: Vec<Appointment>,
    pub blocked_range_conflict: bool,
}
