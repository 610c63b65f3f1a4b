use chrono::{DateTime, NaiveDate, Timelike, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use dentist_cell::models::DentistError;
use dentist_cell::services::work_info::WorkInfoService;
use shared_config::AppConfig;
use shared_database::{postgrest::return_representation_headers, PostgrestClient};
use shared_scheduling::{format_minutes, is_working_day, parse_time_of_day, MINUTES_PER_DAY};

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};
use crate::services::conflict::ConflictService;

pub struct BookingService {
    db: PostgrestClient,
    conflict: ConflictService,
    work_info: WorkInfoService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
            conflict: ConflictService::new(config),
            work_info: WorkInfoService::new(config),
        }
    }

    /// Books an appointment with a server-side conflict guard.
    ///
    /// The conflict check runs immediately before the insert, so of two
    /// clients racing for the same slot the first writer wins and the
    /// second receives a conflict error. The availability view clients use
    /// to pick a slot is a hint only; this check is the authority.
    pub async fn book_appointment(
        &self,
        request: BookAppointmentRequest,
        now: DateTime<Utc>,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let from = parse_time_of_day(&request.time_from).ok_or_else(|| {
            AppointmentError::Validation(format!("unparsable time_from: {:?}", request.time_from))
        })?;
        let to = parse_time_of_day(&request.time_to).ok_or_else(|| {
            AppointmentError::Validation(format!("unparsable time_to: {:?}", request.time_to))
        })?;
        // An end of 00:00 means midnight closing the date, so the last slot
        // of an overnight working window stays bookable.
        let to = if to == 0 { MINUTES_PER_DAY } else { to };

        if from >= to {
            return Err(AppointmentError::Validation(
                "time_from must be before time_to".to_string(),
            ));
        }

        let today = now.date_naive();
        if request.date < today {
            return Err(AppointmentError::Validation(
                "cannot book an appointment in the past".to_string(),
            ));
        }
        if request.date == today {
            let now_minutes = now.time().hour() * 60 + now.time().minute();
            if from < now_minutes {
                return Err(AppointmentError::Validation(
                    "cannot book a slot that has already started".to_string(),
                ));
            }
        }

        let dentist = self
            .work_info
            .get_dentist(request.dentist_id, auth_token)
            .await
            .map_err(map_dentist_error)?;
        let hours = dentist.working_hours().map_err(map_dentist_error)?;

        if !is_working_day(request.date, hours.days_from, hours.days_to) {
            return Err(AppointmentError::Validation(format!(
                "{} is not a working day for this dentist",
                request.date
            )));
        }

        if let Some(patient_id) = request.patient_id {
            if !self.patient_exists(patient_id, auth_token).await? {
                return Err(AppointmentError::PatientNotFound(patient_id));
            }
        }

        let check = self
            .conflict
            .check_conflicts(request.dentist_id, request.date, from, to, None, auth_token)
            .await?;

        if check.has_conflict {
            return Err(AppointmentError::Conflict(format!(
                "slot {}-{} on {} is no longer available",
                format_minutes(from),
                format_minutes(to),
                request.date
            )));
        }

        let body = json!({
            "dentist_id": request.dentist_id,
            "patient_id": request.patient_id,
            "date": request.date,
            "time_from": format!("{}:00", format_minutes(from)),
            "time_to": format!("{}:00", format_minutes(to)),
            "status": "pending",
            "note": request.note,
        });

        let result: Vec<Value> = self
            .db
            .request_with_headers(
                Method::POST,
                "/rest/v1/appointments",
                Some(auth_token),
                Some(body),
                return_representation_headers(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| AppointmentError::DatabaseError("insert returned no row".to_string()))?;

        let appointment: Appointment =
            serde_json::from_value(row).map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        info!(
            "Appointment {} booked with dentist {} on {}",
            appointment.appointment_id, appointment.dentist_id, appointment.date
        );

        Ok(appointment)
    }

    async fn patient_exists(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<bool, AppointmentError> {
        let path = format!("/rest/v1/patients?patient_id=eq.{}", patient_id);
        let rows: Vec<Value> = self
            .db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(!rows.is_empty())
    }

    pub async fn get_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        debug!("Fetching appointment {}", appointment_id);

        let path = format!("/rest/v1/appointments?appointment_id=eq.{}", appointment_id);
        let result: Vec<Appointment> = self
            .db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound(appointment_id))
    }

    pub async fn list_for_dentist(
        &self,
        dentist_id: Uuid,
        date: Option<NaiveDate>,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = format!(
            "/rest/v1/appointments?dentist_id=eq.{}&order=date.asc,time_from.asc",
            dentist_id
        );
        if let Some(date) = date {
            path.push_str(&format!("&date=eq.{}", date));
        }

        self.db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    pub async fn list_for_patient(
        &self,
        patient_id: Uuid,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let path = format!(
            "/rest/v1/appointments?patient_id=eq.{}&order=date.asc,time_from.asc",
            patient_id
        );

        self.db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))
    }

    /// Cancels by status transition. The row stays for history but stops
    /// occupying the calendar.
    pub async fn cancel_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/appointments?appointment_id=eq.{}", appointment_id);
        let body = json!({ "status": "cancelled" });

        let result: Vec<Appointment> = self
            .db
            .request_with_headers(
                Method::PATCH,
                &path,
                Some(auth_token),
                Some(body),
                return_representation_headers(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let appointment = result
            .into_iter()
            .next()
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        info!("Appointment {} cancelled", appointment_id);
        Ok(appointment)
    }

    pub async fn delete_appointment(
        &self,
        appointment_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        let path = format!("/rest/v1/appointments?appointment_id=eq.{}", appointment_id);

        let deleted: Vec<Value> = self
            .db
            .request_with_headers(
                Method::DELETE,
                &path,
                Some(auth_token),
                None,
                return_representation_headers(),
            )
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        if deleted.is_empty() {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        Ok(())
    }
}

fn map_dentist_error(e: DentistError) -> AppointmentError {
    match e {
        DentistError::NotFound(id) => AppointmentError::DentistNotFound(id),
        DentistError::InvalidWorkInfo(msg) | DentistError::Validation(msg) => {
            AppointmentError::Validation(msg)
        }
        other => AppointmentError::DatabaseError(other.to_string()),
    }
}
