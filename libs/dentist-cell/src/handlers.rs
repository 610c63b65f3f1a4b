use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use axum_extra::TypedHeader;
use chrono::{NaiveDate, Timelike, Utc};
use headers::{authorization::Bearer, Authorization};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{CreateBlockedDateRequest, DentistError};
use crate::services::{
    availability::AvailabilityService, blocked::BlockedDateService, work_info::WorkInfoService,
};

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct BlockedDateQuery {
    pub date: Option<NaiveDate>,
}

fn map_dentist_error(e: DentistError) -> AppError {
    match e {
        DentistError::NotFound(_) | DentistError::BlockedDateNotFound(_) => {
            AppError::NotFound(e.to_string())
        }
        DentistError::InvalidWorkInfo(_) | DentistError::Validation(_) => {
            AppError::ValidationError(e.to_string())
        }
        DentistError::Conflict(_) => AppError::Conflict(e.to_string()),
        DentistError::Database(_) => AppError::Database(e.to_string()),
    }
}

fn can_manage_schedule(user: &User, dentist_id: Uuid) -> bool {
    user.is_admin() || (user.is_dentist() && user.id == dentist_id.to_string())
}

#[axum::debug_handler]
pub async fn list_dentists(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
) -> Result<Json<Value>, AppError> {
    let service = WorkInfoService::new(&state);

    let dentists = service
        .list_dentists(auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok(Json(json!({
        "dentists": dentists,
        "total": dentists.len()
    })))
}

#[axum::debug_handler]
pub async fn get_dentist(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(dentist_id): Path<Uuid>,
) -> Result<Json<Value>, AppError> {
    let service = WorkInfoService::new(&state);

    let dentist = service
        .get_dentist(dentist_id, auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok(Json(json!(dentist)))
}

#[axum::debug_handler]
pub async fn get_availability(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);

    // Past-slot exclusion only applies when the requested date is today.
    let now = Utc::now();
    let now_minutes = (query.date == now.date_naive())
        .then(|| now.time().hour() * 60 + now.time().minute());

    let viewer = Uuid::parse_str(&user.id).ok();

    let availability = service
        .day_availability(dentist_id, query.date, viewer, now_minutes, auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok(Json(json!(availability)))
}

#[axum::debug_handler]
pub async fn create_blocked_date(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path(dentist_id): Path<Uuid>,
    Json(request): Json<CreateBlockedDateRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    if !can_manage_schedule(&user, dentist_id) {
        return Err(AppError::Auth(
            "Only the dentist or an admin can manage blocked dates".to_string(),
        ));
    }

    let service = BlockedDateService::new(&state);

    let blocked = service
        .create_blocked_date(dentist_id, request, auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "blocked_date": blocked
        })),
    ))
}

#[axum::debug_handler]
pub async fn list_blocked_dates(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Path(dentist_id): Path<Uuid>,
    Query(query): Query<BlockedDateQuery>,
) -> Result<Json<Value>, AppError> {
    let service = BlockedDateService::new(&state);

    let blocked = service
        .list_blocked_dates(dentist_id, query.date, auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok(Json(json!({
        "blocked_dates": blocked,
        "total": blocked.len()
    })))
}

#[axum::debug_handler]
pub async fn delete_blocked_date(
    State(state): State<Arc<AppConfig>>,
    TypedHeader(auth): TypedHeader<Authorization<Bearer>>,
    Extension(user): Extension<User>,
    Path((dentist_id, blocked_date_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<Value>, AppError> {
    if !can_manage_schedule(&user, dentist_id) {
        return Err(AppError::Auth(
            "Only the dentist or an admin can manage blocked dates".to_string(),
        ));
    }

    let service = BlockedDateService::new(&state);

    service
        .delete_blocked_date(dentist_id, blocked_date_id, auth.token())
        .await
        .map_err(map_dentist_error)?;

    Ok(Json(json!({
        "success": true,
        "deleted": blocked_date_id
    })))
}
