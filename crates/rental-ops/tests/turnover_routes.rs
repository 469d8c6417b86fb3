use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use chrono::{NaiveDate, NaiveDateTime};
use rental_ops::workflows::cleanings::{CleaningAssignment, CleaningId, CleaningStatus};
use rental_ops::workflows::turnover::{
    turnover_router, Apartment, ApartmentId, CleaningPolicy, Reservation, ReservationId,
    ReservationStatus, Snapshot, TurnoverService,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 8, day).expect("valid date")
}

fn snapshot() -> Snapshot {
    let apartments = vec![
        Apartment {
            id: ApartmentId("apt-1".into()),
            name: "Harbor View".into(),
            active: true,
        },
        Apartment {
            id: ApartmentId("apt-2".into()),
            name: "Garden Suite".into(),
            active: true,
        },
    ];

    let stay = |id: &str, apartment: &str, check_in: u32, check_out: u32| Reservation {
        id: ReservationId(id.into()),
        apartment_id: ApartmentId(apartment.into()),
        guest_name: Some(format!("Guest {id}")),
        check_in_date: date(check_in),
        check_out_date: date(check_out),
        planned_arrival_time: None,
        planned_checkout_time: None,
        status: ReservationStatus::Active,
        created_at: None,
    };

    let mut late = stay("r-1", "apt-1", 1, 5);
    late.planned_checkout_time = Some("12:30".into());
    let mut early = stay("r-2", "apt-1", 5, 9);
    early.planned_arrival_time = Some("13:00".into());
    let quiet = stay("r-3", "apt-2", 2, 5);

    let cleaning = |id: &str, assignee: &str, status: CleaningStatus, start: &str| {
        CleaningAssignment {
            id: CleaningId(id.into()),
            apartment_id: ApartmentId("apt-1".into()),
            assignee: assignee.into(),
            status,
            scheduled_start: NaiveDateTime::parse_from_str(start, "%Y-%m-%d %H:%M")
                .expect("valid start"),
            notes: None,
        }
    };

    Snapshot {
        apartments,
        reservations: vec![late, early, quiet],
        cleanings: vec![
            cleaning("c-2", "maria", CleaningStatus::Scheduled, "2025-08-05 13:00"),
            cleaning("c-1", "maria", CleaningStatus::Scheduled, "2025-08-05 11:00"),
            cleaning("c-3", "maria", CleaningStatus::Completed, "2025-08-04 11:00"),
            cleaning("c-4", "jon", CleaningStatus::Scheduled, "2025-08-05 09:00"),
        ],
    }
}

fn build_router() -> axum::Router {
    let service = Arc::new(TurnoverService::new(
        Arc::new(snapshot()),
        CleaningPolicy::default(),
    ));
    turnover_router(service)
}

async fn read_json(response: axum::response::Response) -> Value {
    let body = to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&body).expect("json")
}

#[tokio::test]
async fn get_dashboard_returns_entries_and_summary() {
    let response = build_router()
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/api/v1/turnover/dashboard?date=2025-08-05")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;

    assert_eq!(payload["dashboard"]["date"], json!("2025-08-05"));
    let entries = payload["dashboard"]["apartments"]
        .as_array()
        .expect("apartments array");
    assert_eq!(entries.len(), 2);
    // Garden Suite sorts ahead of Harbor View.
    assert_eq!(entries[0]["apartment"]["id"], json!("apt-2"));
    assert_eq!(entries[1]["cleaning_window"]["duration_minutes"], json!(30));
    assert_eq!(entries[1]["cleaning_window"]["duration_formatted"], json!("0h 30m"));
    assert_eq!(entries[1]["cleaning_window"]["is_critical"], json!(true));
    assert_eq!(entries[1]["is_late_checkout"], json!(true));
    assert_eq!(entries[1]["is_early_checkin"], json!(true));

    assert_eq!(payload["summary"]["critical"], json!(1));
    assert_eq!(payload["summary"]["normal"], json!(1));
    assert_eq!(payload["summary"]["rows"][0]["status_label"], json!("Normal"));
}

#[tokio::test]
async fn get_dashboard_for_a_quiet_day_is_empty() {
    let response = build_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/turnover/dashboard?date=2025-08-20")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["dashboard"]["apartments"], json!([]));
    assert!(payload["dashboard"].get("failures").is_none());
}

#[tokio::test]
async fn get_cleanings_lists_open_work_in_start_order() {
    let response = build_router()
        .oneshot(
            Request::builder()
                .uri("/api/v1/turnover/cleanings?assignee=maria")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    let ids: Vec<&str> = payload
        .as_array()
        .expect("array")
        .iter()
        .filter_map(|item| item["id"].as_str())
        .collect();
    assert_eq!(ids, vec!["c-1", "c-2"]);
}

#[tokio::test]
async fn post_position_maps_time_onto_the_day() {
    let response = build_router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/turnover/timeline/position")
                .header("content-type", "application/json")
                .body(Body::from(json!({ "time": "12:00" }).to_string()))
                .expect("request"),
        )
        .await
        .expect("router dispatch");

    assert_eq!(response.status(), StatusCode::OK);
    let payload = read_json(response).await;
    assert_eq!(payload["time"], json!("12:00"));
    assert_eq!(payload["fraction"], json!(0.5));
    assert_eq!(payload["percent"], json!(50.0));
}
