use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{Appointment, AppointmentError, BookAppointmentRequest};
use crate::services::booking::BookingService;

#[derive(Debug, Deserialize)]
pub struct DentistAppointmentsQuery {
    pub date: Option<NaiveDate>,
}

fn map_appointment_error(e: AppointmentError) -> AppError {
    match e {
        AppointmentError::NotFound(_) => AppError::NotFound(e.to_string()),
        AppointmentError::DentistNotFound(_) => AppError::NotFound(e.to_string()),
        AppointmentError::PatientNotFound(_) => AppError::NotFound(e.to_string()),
        AppointmentError::Validation(_) => AppError::ValidationError(e.to_string()),
        AppointmentError::Conflict(_) => AppError::Conflict(e.to_string()),
        AppointmentError::DatabaseError(_) => AppError::Database(e.to_string()),
    }
}

fn viewer_uuid(user: &User) -> Option<Uuid> {
    Uuid::parse_str(&user.id).ok()
}

fn can_view(user: &User, appointment: &Appointment) -> bool {
    if user.is_admin() {
        return true;
    }
    let id = viewer_uuid(user);
    id == appointment.patient_id || id == Some(appointment.dentist_id)
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Json(mut request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    // Patients always book for themselves; a providerless request (a block
    // on the calendar) is reserved for the dentist or an admin.
    if user.is_patient() {
        let patient_id = viewer_uuid(&user)
            .ok_or_else(|| AppError::Auth("Invalid user id in token".to_string()))?;
        request.patient_id = Some(patient_id);
    } else if request.patient_id.is_none()
        && !user.is_admin()
        && user.id != request.dentist_id.to_string()
    {
        return Err(AppError::Auth(
            "Only the dentist or an admin can block a slot without a patient".to_string(),
        ));
    }

    let service = BookingService::new(&state);

    let appointment = service
        .book_appointment(request, Utc::now(), auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "appointment": appointment
        })),
    ))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    if !can_view(&user, &appointment) {
        return Err(AppError::Auth(
            "Not a participant of this appointment".to_string(),
        ));
    }

    Ok(Json(json!(appointment)))
}

#[axum::debug_handler]
pub async fn list_dentist_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<Uuid>,
    Query(query): Query<DentistAppointmentsQuery>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() && user.id != dentist_id.to_string() {
        return Err(AppError::Auth(
            "Only the dentist or an admin can list a dentist's appointments".to_string(),
        ));
    }

    let service = BookingService::new(&state);

    let appointments = service
        .list_for_dentist(dentist_id, query.date, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn list_patient_appointments(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(patient_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() && user.id != patient_id.to_string() {
        return Err(AppError::Auth(
            "Only the patient or an admin can list a patient's appointments".to_string(),
        ));
    }

    let service = BookingService::new(&state);

    let appointments = service
        .list_for_patient(patient_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "appointments": appointments,
        "total": appointments.len()
    })))
}

#[axum::debug_handler]
pub async fn cancel_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = BookingService::new(&state);

    let appointment = service
        .get_appointment(appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    if !can_view(&user, &appointment) {
        return Err(AppError::Auth(
            "Not a participant of this appointment".to_string(),
        ));
    }

    let cancelled = service
        .cancel_appointment(appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "appointment": cancelled
    })))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    if !user.is_admin() {
        return Err(AppError::Auth(
            "Only an admin can delete an appointment".to_string(),
        ));
    }

    let service = BookingService::new(&state);

    service
        .delete_appointment(appointment_id, auth.token())
        .await
        .map_err(map_appointment_error)?;

    Ok(Json(json!({
        "success": true,
        "deleted": appointment_id
    })))
}
