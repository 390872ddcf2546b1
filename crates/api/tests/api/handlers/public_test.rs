use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{HAIRCUT, LINES, TestContext};

#[tokio::test]
async fn test_health_and_version() {
    let ctx = TestContext::new();

    let health = ctx.server.get("/health").await;
    health.assert_status_ok();
    assert_eq!(
        health.json::<Value>(),
        json!({ "status": "ok", "today": "2024-06-03" })
    );

    let version = ctx.server.get("/version").await;
    version.assert_status_ok();
    let body: Value = version.json();
    assert_eq!(body["service"], "barbershop-api");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_list_services() {
    let ctx = TestContext::new();

    let response = ctx.server.get("/api/services").await;

    response.assert_status_ok();
    let services: Vec<Value> = response.json();
    assert_eq!(services.len(), 5);
    assert_eq!(services[0]["name"], HAIRCUT);
    assert_eq!(services[0]["category"], "BASE");
    assert_eq!(services[0]["duration_minutes"], 30);
}

#[tokio::test]
async fn test_booking_context() {
    let ctx = TestContext::new();

    let body: Value = ctx.server.get("/api/booking/context").await.json();

    assert_eq!(body["today"], "2024-06-03");
    assert_eq!(body["today_name"], "Lunes");
    assert_eq!(body["today_closed"], false);
    assert_eq!(body["operating_days"].as_array().unwrap().len(), 6);
    assert_eq!(body["window"], json!({ "from": "2024-06-03", "to": "2024-06-08" }));
}

#[tokio::test]
async fn test_window() {
    let ctx = TestContext::new();
    let body: Value = ctx.server.get("/api/window").await.json();
    assert_eq!(body, json!({ "from": "2024-06-03", "to": "2024-06-08" }));
}

#[tokio::test]
async fn test_slots_for_a_weekday() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get("/api/slots")
        .add_query_param("date", "2024-06-04")
        .add_query_param("service", ctx.service_id(HAIRCUT))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    let slots = body["slots"].as_array().unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0], "12:00");
    assert_eq!(slots[15], "19:30");
}

#[rstest]
#[case(None, None)]
#[case(Some("2024-06-04"), None)]
#[case(Some("04-06-2024"), Some("haircut"))]
#[case(Some("not-a-date"), Some("00000000-0000-0000-0000-000000000000"))]
#[case(Some("2024-06-04"), Some("00000000-0000-0000-0000-000000000000"))]
#[tokio::test]
async fn test_slots_with_bad_params_are_empty(
    #[case] date: Option<&str>,
    #[case] service: Option<&str>,
) {
    let ctx = TestContext::new();
    let mut request = ctx.server.get("/api/slots");
    if let Some(date) = date {
        request = request.add_query_param("date", date);
    }
    if let Some(service) = service {
        request = request.add_query_param("service", service);
    }

    let response = request.await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!({ "slots": [] }));
}

#[tokio::test]
async fn test_book_and_fetch_receipt() {
    let ctx = TestContext::new();
    let mut body = ctx.booking_body(HAIRCUT, "2024-06-05", "17:30");
    body["extras"] = json!([ctx.service_id(LINES)]);

    let response = ctx.server.post("/api/appointments").json(&body).await;

    response.assert_status(StatusCode::CREATED);
    let appointment: Value = response.json();
    assert_eq!(appointment["status"], "pending");
    assert_eq!(appointment["slot"], "17:30");
    assert_eq!(appointment["day"], "Miércoles");

    let id = appointment["id"].as_str().unwrap();
    let receipt = ctx
        .server
        .get(&format!("/api/appointments/{}/receipt", id))
        .await;
    receipt.assert_status_ok();
    let receipt: Value = receipt.json();
    assert_eq!(receipt["client_name"], "Juan Soto");
    assert_eq!(receipt["date"], "05-06-2024");
    assert_eq!(receipt["total"], 9000);
    assert_eq!(receipt["extras"], json!([LINES]));
}

#[tokio::test]
async fn test_repeated_extra_is_charged_once() {
    let ctx = TestContext::new();
    let lines = ctx.service_id(LINES);
    let mut body = ctx.booking_body(HAIRCUT, "2024-06-04", "12:00");
    body["extras"] = json!([lines, lines, lines]);

    let response = ctx.server.post("/api/appointments").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    let id = response.json::<Value>()["id"].as_str().unwrap().to_string();

    let receipt: Value = ctx
        .server
        .get(&format!("/api/appointments/{}/receipt", id))
        .await
        .json();
    assert_eq!(receipt["total"], 9000);
    assert_eq!(receipt["extras"], json!([LINES]));
}

#[tokio::test]
async fn test_booking_with_missing_fields() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&json!({ "name": "Juan", "phone": "912345678" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Missing required fields: rut, service_id, date, slot"
    );
}

#[tokio::test]
async fn test_booking_with_invalid_rut() {
    let ctx = TestContext::new();
    let mut body = ctx.booking_body(HAIRCUT, "2024-06-04", "12:00");
    body["rut"] = json!("11.111.111-2");

    let response = ctx.server.post("/api/appointments").json(&body).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(ctx.store.appointments().is_empty());
}

#[tokio::test]
async fn test_booking_a_taken_slot() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-04", "13:00").await;

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&ctx.booking_body(HAIRCUT, "2024-06-04", "13:00"))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "The 13:00 slot is already taken, please pick another one"
    );
}

#[tokio::test]
async fn test_booking_outside_window() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .post("/api/appointments")
        .json(&ctx.booking_body(HAIRCUT, "2024-06-11", "13:00"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_occupied_rows() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-04", "14:30").await;

    let body: Value = ctx
        .server
        .get("/api/occupied")
        .add_query_param("date", "2024-06-04")
        .await
        .json();

    assert_eq!(
        body,
        json!({ "rows": [{ "day": "Martes", "date": "04-06-2024", "slot": "14:30" }] })
    );

    let empty: Value = ctx.server.get("/api/occupied").await.json();
    assert_eq!(empty, json!({ "rows": [] }));
}

#[tokio::test]
async fn test_unknown_receipt() {
    let ctx = TestContext::new();

    let response = ctx
        .server
        .get(&format!("/api/appointments/{}/receipt", Uuid::new_v4()))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_agenda() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-03", "12:00").await;
    ctx.book(HAIRCUT, "2024-06-04", "12:00").await;

    let today: Value = ctx.server.get("/api/agenda").await.json();
    assert_eq!(today["date"], "2024-06-03");
    assert_eq!(today["appointments"].as_array().unwrap().len(), 1);
    assert_eq!(today["week"].as_array().unwrap().len(), 7);

    let tuesday: Value = ctx
        .server
        .get("/api/agenda")
        .add_query_param("date", "2024-06-04")
        .await
        .json();
    assert_eq!(tuesday["label"], "Martes 04-06-2024");

    let bad = ctx
        .server
        .get("/api/agenda")
        .add_query_param("date", "tomorrow")
        .await;
    bad.assert_status(StatusCode::BAD_REQUEST);
}
