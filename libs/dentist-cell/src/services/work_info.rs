use anyhow::Result;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::PostgrestClient;

use crate::models::{Dentist, DentistError};

pub struct WorkInfoService {
    db: PostgrestClient,
}

impl WorkInfoService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            db: PostgrestClient::new(config),
        }
    }

    pub async fn get_dentist(
        &self,
        dentist_id: Uuid,
        auth_token: &str,
    ) -> Result<Dentist, DentistError> {
        debug!("Fetching dentist record: {}", dentist_id);

        let path = format!("/rest/v1/dentists?dentist_id=eq.{}", dentist_id);
        let result: Vec<Value> = self
            .db
            .request(Method::GET, &path, Some(auth_token), None)
            .await
            .map_err(|e| DentistError::Database(e.to_string()))?;

        let row = result
            .into_iter()
            .next()
            .ok_or(DentistError::NotFound(dentist_id))?;

        serde_json::from_value(row).map_err(|e| DentistError::Database(e.to_string()))
    }

    pub async fn list_dentists(&self, auth_token: &str) -> Result<Vec<Dentist>, DentistError> {
        let result: Vec<Dentist> = self
            .db
            .request(Method::GET, "/rest/v1/dentists?order=name.asc", Some(auth_token), None)
            .await
            .map_err(|e| DentistError::Database(e.to_string()))?;

        Ok(result)
    }
}
