use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dentist_cell::models::{CreateBlockedDateRequest, DentistError};
use dentist_cell::services::blocked::BlockedDateService;
use shared_utils::test_utils::TestConfig;

const TOKEN: &str = "test-token";

fn request(time_from: &str, time_to: &str) -> CreateBlockedDateRequest {
    CreateBlockedDateRequest {
        date: NaiveDate::from_ymd_opt(2025, 6, 2).unwrap(),
        time_from: time_from.to_string(),
        time_to: time_to.to_string(),
        reason: Some("maintenance".to_string()),
    }
}

#[tokio::test]
async fn creates_blocked_range() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();
    let blocked_date_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .and(query_param("dentist_id", format!("eq.{}", dentist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "blocked_date_id": blocked_date_id,
                "dentist_id": dentist_id,
                "date": "2025-06-02",
                "time_from": "13:00:00",
                "time_to": "14:00:00",
                "reason": "maintenance"
            }
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = BlockedDateService::new(&config);

    let blocked = service
        .create_blocked_date(dentist_id, request("13:00", "14:00"), TOKEN)
        .await
        .unwrap();

    assert_eq!(blocked.blocked_date_id, blocked_date_id);
    assert_eq!(blocked.dentist_id, dentist_id);
}

#[tokio::test]
async fn rejects_inverted_range() {
    let server = MockServer::start().await;
    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = BlockedDateService::new(&config);

    let err = service
        .create_blocked_date(Uuid::new_v4(), request("14:00", "13:00"), TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(err, DentistError::Validation(_)));

    let err = service
        .create_blocked_date(Uuid::new_v4(), request("13:00", "13:00"), TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(err, DentistError::Validation(_)));
}

#[tokio::test]
async fn rejects_unparsable_times() {
    let server = MockServer::start().await;
    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = BlockedDateService::new(&config);

    let err = service
        .create_blocked_date(Uuid::new_v4(), request("soonish", "14:00"), TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, DentistError::Validation(_)));
}

#[tokio::test]
async fn rejects_overlap_with_existing_block() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "blocked_date_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "date": "2025-06-02",
                "time_from": "13:30:00",
                "time_to": "15:00:00",
                "reason": null
            }
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = BlockedDateService::new(&config);

    let err = service
        .create_blocked_date(dentist_id, request("13:00", "14:00"), TOKEN)
        .await
        .unwrap_err();
    assert!(matches!(err, DentistError::Conflict(_)));

    // A back-to-back range touches but does not overlap.
    Mock::given(method("POST"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            {
                "blocked_date_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "date": "2025-06-02",
                "time_from": "12:00:00",
                "time_to": "13:30:00",
                "reason": "maintenance"
            }
        ])))
        .mount(&server)
        .await;

    let created = service
        .create_blocked_date(dentist_id, request("12:00", "13:30"), TOKEN)
        .await;
    assert!(created.is_ok());
}

#[tokio::test]
async fn delete_missing_block_is_not_found() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();
    let blocked_date_id = Uuid::new_v4();

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = BlockedDateService::new(&config);

    let err = service
        .delete_blocked_date(dentist_id, blocked_date_id, TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, DentistError::BlockedDateNotFound(id) if id == blocked_date_id));
}
