use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::{postgrest::return_representation_headers, PostgrestClient};
use shared_scheduling::{format_minutes, overlaps, parse_time_of_day};

use crate::models::{BlockedDate, CreateBlockedDateRequest, DentistError};

pub struct BlockedDateService {
    db: PostgrestClient,
}

impl BlockedDateService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    /// Creates a blocked range after validating the window and rejecting
    /// overlaps with the dentist's existing blocks on that date.
    pub async fn create_blocked_date(
        &self,
        dentist_id: Uuid,
        request: CreateBlockedDateRequest,
        auth_token: &str,
    ) -> Result<BlockedDate, DentistError> {
        let from = parse_time_of_day(&request.time_from).ok_or_else(|| {
            DentistError::Validation(format!("unparsable time_from: {:?}", request.time_from))
        })?;
        let to = parse_time_of_day(&request.time_to).ok_or_else(|| {
            DentistError::Validation(format!("unparsable time_to: {:?}", request.time_to))
        })?;

        if from >= to {
            return Err(DentistError::Validation(
                "time_from must be before time_to".to_string(),
            ));
        }

        let existing = self
            .list_blocked_dates(dentist_id, Some(request.date), auth_token)
            .await?;

        for blocked in &existing {
            let b_from = minutes_of(blocked.time_from);
            let b_to = minutes_of(blocked.time_to);
            if overlaps(from, to, b_from, b_to) {
                return Err(DentistError::Conflict(format!(
                    "overlaps existing blocked range {}-{}",
                    format_minutes(b_from),
                    format_minutes(b_to)
                )));
            }
        }

        let body = json!({
            "dentist_id": dentist_id,
            "date": request.date,
            "time_from": format!("{}:00", format_minutes(from)),
            "time_to": format!("{}:00", format_minutes(to)),
            "reason": request.reason,
        });

        let result: Vec<Value> = self
            .db
            .request_with_headers(
                Method::POST,
                "/rest/v1/blocked_dates",
                Some(auth_token),
                Some(body),
                return_representation_headers(),
            )
            .await
            .map_err(|e| DentistError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or_else(|| DentistError::Database("insert returned no row".to_string()))?;

        debug!("Blocked range created for dentist {}", dentist_id);
        serde_json::from_value(row).map_err(|e| DentistError::Database(e.to_string()))
    }

    pub async fn list_blocked_dates(
        &self,
        dentist_id: Uuid,
        date: Option<NaiveDate>,
        auth_token: &str,
    ) -> Result<Vec<BlockedDate>, DentistError> {
        let mut path = format!("/rest/v1/blocked_dates?dentist_id=eq.{}", dentist_id);
        if let Some(date) = date {
            path.push_str(&format!("&date=eq.{}", date));
        }

        self.db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DentistError::Database(e.to_string()))
    }

    pub async fn delete_blocked_date(
        &self,
        dentist_id: Uuid,
        blocked_date_id: Uuid,
        auth_token: &str,
    ) -> Result<(), DentistError> {
        let path = format!(
            "/rest/v1/blocked_dates?blocked_date_id=eq.{}&dentist_id=eq.{}",
            blocked_date_id, dentist_id
        );

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
            .map_err(|e| DentistError::Database(e.to_string()))?;

        if deleted.is_empty() {
            return Err(DentistError::BlockedDateNotFound(blocked_date_id));
        }

        Ok(())
    }
}

pub(crate) fn minutes_of(t: chrono::NaiveTime) -> u32 {
    use chrono::Timelike;
    t.hour() * 60 + t.minute()
}
