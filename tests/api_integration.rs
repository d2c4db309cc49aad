use chrono::NaiveDate;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use motorpool::api::ReservationClient;
use motorpool::config::{ApiConfig, BookingConfig, Config, WatchConfig};
use motorpool::reservation::{CarId, NewReservation};

/// Create a test config pointed at the mock server
fn test_config(base_url: &str) -> Config {
    Config {
        api: ApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
        },
        booking: BookingConfig {
            email: "user@example.com".to_string(),
            reason: "business trip".to_string(),
        },
        watch: WatchConfig::default(),
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── fetch_calendar tests ─────────────────────────────────────────

#[tokio::test]
async fn fetch_calendar_parses_reservations() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservation_calendar"))
        .and(query_param("type", "car"))
        .and(query_param("date_from", "2025-08-01"))
        .and(query_param("date_to", "2025-08-31T23:59:59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": [
                {
                    "id": 11,
                    "type": "car",
                    "target": 1,
                    "emailaddress": "a@example.com",
                    "time": "2025-08-07T09:00:00+09:00",
                    "session": 2,
                    "reason": "client visit",
                    "created_at": "2025-08-01T08:00:00+09:00"
                },
                {
                    "id": 12,
                    "type": "car",
                    "target": 2,
                    "time": "2025-08-07 13:00:00",
                    "emailaddress": "b@example.com",
                    "session": 1,
                    "reason": "errand"
                }
            ]
        })))
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let reservations = client
        .fetch_calendar(date(2025, 8, 1), date(2025, 8, 31))
        .await
        .unwrap();

    assert_eq!(reservations.len(), 2);
    assert_eq!(reservations[0].id, 11);
    assert_eq!(reservations[0].target, 1);
    assert!(reservations[0].is_car());
    // Naive backend timestamp resolves in the fleet timezone.
    let start = reservations[1].start_time().unwrap();
    assert_eq!(start.to_rfc3339(), "2025-08-07T13:00:00+09:00");
}

#[tokio::test]
async fn fetch_month_pads_the_range_by_seven_days() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservation_calendar"))
        .and(query_param("date_from", "2025-07-25"))
        .and(query_param("date_to", "2025-09-07T23:59:59"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let reservations = client.fetch_month(2025, 8).await.unwrap();
    assert!(reservations.is_empty());
}

#[tokio::test]
async fn fetch_calendar_http_failure() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservation_calendar"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let result = client.fetch_calendar(date(2025, 8, 1), date(2025, 8, 31)).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn fetch_calendar_surfaces_rejection_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservation_calendar"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": false,
            "message": "date range too large"
        })))
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let err = client
        .fetch_calendar(date(2025, 8, 1), date(2025, 8, 31))
        .await
        .unwrap_err();
    assert!(format!("{}", err).contains("date range too large"));
}

// ── create_reservation tests ─────────────────────────────────────

#[tokio::test]
async fn create_reservation_success() {
    let server = MockServer::start().await;

    let request = NewReservation::for_slots(
        date(2025, 8, 7),
        CarId::One,
        13,
        4,
        "user@example.com",
        "business trip",
    )
    .unwrap();

    Mock::given(method("POST"))
        .and(path("/api/reservation_create"))
        .and(body_json(serde_json::json!({
            "type": "car",
            "target": 1,
            "emailaddress": "user@example.com",
            "time": "2025-08-07T13:00:00+09:00",
            "session": 4,
            "reason": "business trip"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "id": 77,
                "type": "car",
                "target": 1,
                "emailaddress": "user@example.com",
                "time": "2025-08-07T13:00:00+09:00",
                "session": 4,
                "reason": "business trip",
                "created_at": "2025-08-01T08:00:00+09:00"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let created = client.create_reservation(&request).await.unwrap();
    assert_eq!(created.id, 77);
    assert_eq!(created.session, 4);
}

#[tokio::test]
async fn create_reservation_conflict_surfaces_server_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/reservation_create"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "success": false,
            "message": "Slot already taken"
        })))
        .mount(&server)
        .await;

    let request = NewReservation::for_slots(
        date(2025, 8, 7),
        CarId::Two,
        9,
        1,
        "user@example.com",
        "errand",
    )
    .unwrap();

    let client = ReservationClient::new(&test_config(&server.uri()));
    let err = client.create_reservation(&request).await.unwrap_err();
    assert!(
        format!("{}", err).contains("Slot already taken"),
        "Expected server message, got: {}",
        err
    );
}

// ── lookup / cancel tests ────────────────────────────────────────

#[tokio::test]
async fn get_reservation_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/reservations/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "data": {
                "id": 42,
                "type": "car",
                "target": 2,
                "emailaddress": "user@example.com",
                "time": "2025-08-07T09:00:00+09:00",
                "session": 3,
                "reason": "airport run"
            }
        })))
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    let reservation = client.get_reservation(42).await.unwrap();
    assert_eq!(reservation.id, 42);
    assert_eq!(reservation.target, 2);
    assert_eq!(reservation.reason, "airport run");
}

#[tokio::test]
async fn cancel_reservation_success() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/reservations/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    assert!(client.cancel_reservation(42).await.is_ok());
}

#[tokio::test]
async fn cancel_reservation_failure() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/reservations/42"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "success": false,
            "message": "not found"
        })))
        .mount(&server)
        .await;

    let client = ReservationClient::new(&test_config(&server.uri()));
    assert!(client.cancel_reservation(42).await.is_err());
}
