use chrono::NaiveDate;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use dentist_cell::models::DentistError;
use dentist_cell::services::availability::AvailabilityService;
use shared_scheduling::SlotStatus;
use shared_utils::test_utils::TestConfig;

const TOKEN: &str = "test-token";

fn dentist_row(dentist_id: Uuid) -> serde_json::Value {
    json!({
        "dentist_id": dentist_id,
        "name": "Dr. Molar",
        "email": "molar@clinic.example",
        "phone": null,
        "work_time_from": "9:00 AM",
        "work_time_to": "12:00 PM",
        "work_days_from": "Monday",
        "work_days_to": "Friday",
        "appointment_duration": "30 minutes",
        "appointment_fee": 80.0,
        "service_types": "checkup, cleaning"
    })
}

async fn mount_dentist(server: &MockServer, dentist_id: Uuid) {
    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .and(query_param("dentist_id", format!("eq.{}", dentist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([dentist_row(dentist_id)])))
        .mount(server)
        .await;
}

// 2025-06-02 is a Monday.
fn monday() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
}

#[tokio::test]
async fn classifies_booked_blocked_and_user_slots() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();
    let viewer = Uuid::new_v4();
    let other_patient = Uuid::new_v4();

    mount_dentist(&server, dentist_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .and(query_param("dentist_id", format!("eq.{}", dentist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "appointment_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "patient_id": viewer,
                "date": "2025-06-02",
                "time_from": "09:00:00",
                "time_to": "09:30:00",
                "status": "confirmed"
            },
            {
                "appointment_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "patient_id": other_patient,
                "date": "2025-06-02",
                "time_from": "10:00:00",
                "time_to": "10:30:00",
                "status": "pending"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "blocked_date_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "date": "2025-06-02",
                "time_from": "11:00:00",
                "time_to": "11:30:00",
                "reason": "staff meeting"
            }
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let day = service
        .day_availability(dentist_id, monday(), Some(viewer), None, TOKEN)
        .await
        .unwrap();

    assert!(day.working_day);
    assert_eq!(day.slot_minutes, 30);
    assert_eq!(day.slots.len(), 6); // 09:00-12:00 in 30-minute slots

    let statuses: Vec<SlotStatus> = day.slots.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            SlotStatus::UserBooked, // 09:00
            SlotStatus::Available,  // 09:30
            SlotStatus::Booked,     // 10:00
            SlotStatus::Available,  // 10:30
            SlotStatus::Blocked,    // 11:00
            SlotStatus::Available,  // 11:30
        ]
    );
    assert_eq!(day.slots[0].time_from, "09:00");
    assert_eq!(day.slots[5].time_to, "12:00");
}

#[tokio::test]
async fn cancelled_appointments_free_the_slot() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    mount_dentist(&server, dentist_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "appointment_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "patient_id": Uuid::new_v4(),
                "date": "2025-06-02",
                "time_from": "09:00:00",
                "time_to": "09:30:00",
                "status": "cancelled"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let day = service
        .day_availability(dentist_id, monday(), None, None, TOKEN)
        .await
        .unwrap();

    assert!(day.slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[tokio::test]
async fn non_working_day_has_no_slots() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    mount_dentist(&server, dentist_id).await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    // 2025-06-08 is a Sunday.
    let sunday = NaiveDate::from_ymd_opt(2025, 6, 8).unwrap();
    let day = service
        .day_availability(dentist_id, sunday, None, None, TOKEN)
        .await
        .unwrap();

    assert!(!day.working_day);
    assert!(day.slots.is_empty());
}

#[tokio::test]
async fn fetch_failure_fails_open() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    mount_dentist(&server, dentist_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "blocked_date_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "date": "2025-06-02",
                "time_from": "09:00:00",
                "time_to": "12:00:00",
                "reason": null
            }
        ])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let day = service
        .day_availability(dentist_id, monday(), None, None, TOKEN)
        .await
        .unwrap();

    // One fetch failed, so the whole day shows as available even though a
    // blocked range exists. The booking guard still rejects the conflict.
    assert!(day.working_day);
    assert_eq!(day.slots.len(), 6);
    assert!(day.slots.iter().all(|s| s.status == SlotStatus::Available));
}

#[tokio::test]
async fn past_slots_blocked_when_date_is_today() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    mount_dentist(&server, dentist_id).await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    // Clock at 10:10: the 09:00, 09:30 and 10:00 slots already started.
    let day = service
        .day_availability(dentist_id, monday(), None, Some(610), TOKEN)
        .await
        .unwrap();

    let statuses: Vec<SlotStatus> = day.slots.iter().map(|s| s.status).collect();
    assert_eq!(
        statuses,
        vec![
            SlotStatus::Blocked,
            SlotStatus::Blocked,
            SlotStatus::Blocked,
            SlotStatus::Available,
            SlotStatus::Available,
            SlotStatus::Available,
        ]
    );
}

#[tokio::test]
async fn overnight_window_only_advertises_slots_up_to_midnight() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();
    let night_owl = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .and(query_param("dentist_id", format!("eq.{}", dentist_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "dentist_id": dentist_id,
                "name": "Dr. Nocturne",
                "email": "nocturne@clinic.example",
                "work_time_from": "10:00 PM",
                "work_time_to": "2:00 AM",
                "work_days_from": "Monday",
                "work_days_to": "Friday",
                "appointment_duration": "60 minutes"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/appointments"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "appointment_id": Uuid::new_v4(),
                "dentist_id": dentist_id,
                "patient_id": night_owl,
                "date": "2025-06-02",
                "time_from": "23:00:00",
                "time_to": "00:00:00",
                "status": "pending"
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/blocked_dates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let day = service
        .day_availability(dentist_id, monday(), None, None, TOKEN)
        .await
        .unwrap();

    // The 00:00-01:00 and 01:00-02:00 slots belong to the next date and
    // are not advertised here; the slot closing the day at midnight is,
    // and its stored 00:00 end still marks it busy.
    assert_eq!(day.slots.len(), 2);
    assert_eq!(day.slots[0].time_from, "22:00");
    assert_eq!(day.slots[0].status, SlotStatus::Available);
    assert_eq!(day.slots[1].time_from, "23:00");
    assert_eq!(day.slots[1].time_to, "00:00");
    assert_eq!(day.slots[1].status, SlotStatus::Booked);
}

#[tokio::test]
async fn unknown_dentist_is_not_found() {
    let server = MockServer::start().await;
    let dentist_id = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let config = TestConfig::with_data_api(&server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let err = service
        .day_availability(dentist_id, monday(), None, None, TOKEN)
        .await
        .unwrap_err();

    assert!(matches!(err, DentistError::NotFound(id) if id == dentist_id));
}
