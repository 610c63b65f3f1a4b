use chrono::{NaiveDate, NaiveTime, Timelike};
use futures::join;
use reqwest::Method;
use serde::Deserialize;
use tracing::{debug, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;
use shared_scheduling::{overlaps, wrap_end};

use crate::models::{Appointment, AppointmentError, ConflictCheck};

#[derive(Debug, Deserialize)]
struct BlockedRow {
    time_from: NaiveTime,
    time_to: NaiveTime,
}

pub struct ConflictService {
    db: PostgrestClient,
}

impl ConflictService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Checks a candidate interval against the dentist's calendar for that
    /// date: active appointments and blocked ranges both count.
    pub async fn check_conflicts(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
        from_minutes: u32,
        to_minutes: u32,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<ConflictCheck, AppointmentError> {
        debug!(
            "Checking conflicts for dentist {} on {} ({}-{} min)",
            dentist_id, date, from_minutes, to_minutes
        );

        let (appointments, blocked) = join!(
            self.get_appointments_on_date(dentist_id, date, exclude_appointment_id, auth_token),
            self.get_blocked_on_date(dentist_id, date, auth_token)
        );
        let (appointments, blocked) = (appointments?, blocked?);

        let conflicting_appointments: Vec<Appointment> = appointments
            .into_iter()
            .filter(|a| a.status.occupies_calendar())
            .filter(|a| {
                let b_start = minutes_of(a.time_from);
                // Rows closing the day end at 00:00, which reads as 1440.
                let b_end = wrap_end(b_start, minutes_of(a.time_to));
                overlaps(from_minutes, to_minutes, b_start, b_end)
            })
            .collect();

        let blocked_range_conflict = blocked.iter().any(|b| {
            let b_start = minutes_of(b.time_from);
            let b_end = wrap_end(b_start, minutes_of(b.time_to));
            overlaps(from_minutes, to_minutes, b_start, b_end)
        });

        let has_conflict = !conflicting_appointments.is_empty() || blocked_range_conflict;

        if has_conflict {
            warn!(
                "Conflict for dentist {} on {}: {} appointment(s), blocked range: {}",
                dentist_id,
                date,
                conflicting_appointments.len(),
                blocked_range_conflict
            );
        }

        Ok(ConflictCheck {
            has_conflict,
            conflicting_appointments,
            blocked_range_conflict,
        })
    }

    async fn get_appointments_on_date(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
        exclude_appointment_id: Option<Uuid>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?dentist_id=eq.{}&date=eq.{}&order=time_from.asc",
            dentist_id, date
        );
        if let Some(exclude_id) = exclude_appointment_id {
            path.push_str(&format!("&appointment_id=neq.{}", exclude_id));
        }

        self.db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    async fn get_blocked_on_date(
        &self,
        dentist_id: Uuid,
        date: NaiveDate,
        auth_token: &str,
    ) -> Result<Vec<BlockedRow>, AppointmentError> {
        let path = format!(
            "/rest/v1/blocked_dates?dentist_id=eq.{}&date=eq.{}",
            dentist_id, date
        );

        self.db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }
}

pub(crate) fn minutes_of(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}
