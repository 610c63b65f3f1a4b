use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use shared_scheduling::{
    parse_duration_minutes, parse_time_of_day, parse_weekday, SlotStatus, WorkingHours,
    DEFAULT_SLOT_MINUTES,
};

#[derive(Error, Debug)]
pub enum DentistError {
    #[error("Dentist not found: {0}")]
    NotFound(Uuid),

    #[error("Blocked date not found: {0}")]
    BlockedDateNotFound(Uuid),

    #[error("Invalid work info: {0}")]
    InvalidWorkInfo(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),
}

/// A dentist record as stored in the data API. The work-pattern fields are
/// free text maintained through the practice admin UI, so they are parsed
/// defensively on the way in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dentist {
    pub dentist_id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub work_time_from: String,
    pub work_time_to: String,
    pub work_days_from: String,
    pub work_days_to: String,
    pub appointment_duration: Option<String>,
    pub appointment_fee: Option<f64>,
    pub service_types: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Dentist {
    /// Normalizes the textual work-pattern fields into typed working hours.
    ///
    /// An unparsable duration falls back to the default slot length; an
    /// unparsable time or day field means the record cannot describe a
    /// working window at all and is reported as invalid.
    pub fn working_hours(&self) -> Result<WorkingHours, DentistError> {
        let start_minutes = parse_time_of_day(&self.work_time_from).ok_or_else(|| {
            DentistError::InvalidWorkInfo(format!(
                "unparsable work_time_from: {:?}",
                self.work_time_from
            ))
        })?;
        let end_minutes = parse_time_of_day(&self.work_time_to).ok_or_else(|| {
            DentistError::InvalidWorkInfo(format!(
                "unparsable work_time_to: {:?}",
                self.work_time_to
            ))
        })?;
        let days_from = parse_weekday(&self.work_days_from).ok_or_else(|| {
            DentistError::InvalidWorkInfo(format!(
                "unparsable work_days_from: {:?}",
                self.work_days_from
            ))
        })?;
        let days_to = parse_weekday(&self.work_days_to).ok_or_else(|| {
            DentistError::InvalidWorkInfo(format!(
                "unparsable work_days_to: {:?}",
                self.work_days_to
            ))
        })?;

        let slot_minutes = self
            .appointment_duration
            .as_deref()
            .map(parse_duration_minutes)
            .unwrap_or(DEFAULT_SLOT_MINUTES);

        Ok(WorkingHours {
            start_minutes,
            end_minutes,
            days_from,
            days_to,
            slot_minutes,
        })
    }
}

/// A provider-side unavailability range: semantically an appointment with
/// no patient.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDate {
    pub blocked_date_id: Uuid,
    pub dentist_id: Uuid,
    pub date: NaiveDate,
    pub time_from: NaiveTime,
    pub time_to: NaiveTime,
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateBlockedDateRequest {
    pub date: NaiveDate,
    pub time_from: String,
    pub time_to: String,
    pub reason: Option<String>,
}

/// One classified slot in an availability response, labels in `"HH:MM"`.
#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub time_from: String,
    pub time_to: String,
    pub status: SlotStatus,
}

#[derive(Debug, Serialize)]
pub struct DayAvailability {
    pub dentist_id: Uuid,
    pub date: NaiveDate,
    pub working_day: bool,
    pub slot_minutes: u32,
    pub slots: Vec<SlotView>,
}
