use axum::http::StatusCode;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::test_utils::{HAIRCUT, LINES, TestContext};

fn status_path(id: Uuid) -> String {
    format!("/panel/appointments/{}/status", id)
}

#[test_log::test(tokio::test)]
async fn test_cancel_releases_slot() {
    let ctx = TestContext::new();
    let id = ctx.book(HAIRCUT, "2024-06-04", "12:00").await;

    let response = ctx
        .server
        .post(&status_path(id))
        .json(&json!({ "status": "C" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "cancelled");

    let again = ctx
        .server
        .post("/api/appointments")
        .json(&ctx.booking_body(HAIRCUT, "2024-06-04", "12:00"))
        .await;
    again.assert_status(StatusCode::CREATED);
}

#[tokio::test]
async fn test_reactivation_conflict() {
    let ctx = TestContext::new();
    let first = ctx.book(HAIRCUT, "2024-06-04", "12:00").await;
    ctx.server
        .post(&status_path(first))
        .json(&json!({ "status": "C" }))
        .await
        .assert_status_ok();
    ctx.book(HAIRCUT, "2024-06-04", "12:00").await;

    let response = ctx
        .server
        .post(&status_path(first))
        .json(&json!({ "status": "P" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    assert_eq!(
        response.json::<Value>()["error"],
        "Cannot reactivate: the 12:00 slot was taken by another appointment"
    );
}

#[tokio::test]
async fn test_status_errors() {
    let ctx = TestContext::new();
    let id = ctx.book(HAIRCUT, "2024-06-04", "12:00").await;

    ctx.server
        .post(&status_path(id))
        .json(&json!({ "status": "done" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);

    ctx.server
        .post(&status_path(Uuid::new_v4()))
        .json(&json!({ "status": "A" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_listing_with_search() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-04", "12:00").await;
    let mut body = ctx.booking_body(LINES, "2024-06-04", "12:30");
    body["name"] = json!("Valentina Rojas");
    body["rut"] = json!("11111111-1");
    ctx.server
        .post("/api/appointments")
        .json(&body)
        .await
        .assert_status(StatusCode::CREATED);

    let all: Vec<Value> = ctx.server.get("/panel/appointments").await.json();
    assert_eq!(all.len(), 2);

    let found: Vec<Value> = ctx
        .server
        .get("/panel/appointments")
        .add_query_param("q", "valentina")
        .await
        .json();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["client_rut"], "11.111.111-1");
    assert_eq!(found[0]["service"]["name"], LINES);
}

#[tokio::test]
async fn test_listing_by_weekday() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-04", "12:00").await;
    ctx.book(HAIRCUT, "2024-06-05", "12:00").await;

    let wednesdays: Vec<Value> = ctx
        .server
        .get("/panel/appointments")
        .add_query_param("day", "miércoles")
        .await
        .json();
    assert_eq!(wednesdays.len(), 1);
    assert_eq!(wednesdays[0]["date"], "2024-06-05");

    let unknown_day: Vec<Value> = ctx
        .server
        .get("/panel/appointments")
        .add_query_param("day", "someday")
        .await
        .json();
    assert_eq!(unknown_day.len(), 2);
}

#[tokio::test]
async fn test_calendar_events() {
    let ctx = TestContext::new();
    ctx.book("Perfilado de barba", "2024-06-05", "15:00").await;

    let events: Vec<Value> = ctx
        .server
        .get("/panel/events")
        .add_query_param("start", "2024-06-03")
        .add_query_param("end", "2024-06-10")
        .await
        .json();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["start"], "2024-06-05T15:00:00");
    assert_eq!(events[0]["end"], "2024-06-05T16:00:00");
    assert_eq!(events[0]["color"], "#f59e0b");
    assert_eq!(events[0]["extendedProps"]["weekday"], "Miércoles");

    let next_week: Vec<Value> = ctx
        .server
        .get("/panel/events")
        .add_query_param("start", "2024-06-10")
        .add_query_param("end", "2024-06-17")
        .await
        .json();
    assert!(next_week.is_empty());
}

#[tokio::test]
async fn test_calendar_events_with_datetime_bounds() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-05", "12:00").await;
    ctx.book(HAIRCUT, "2024-06-08", "12:00").await;

    let this_week: Vec<Value> = ctx
        .server
        .get("/panel/events")
        .add_query_param("start", "2024-06-03T00:00:00-04:00")
        .add_query_param("end", "2024-06-10T00:00:00-04:00")
        .await
        .json();
    assert_eq!(this_week.len(), 2);

    let next_week: Vec<Value> = ctx
        .server
        .get("/panel/events")
        .add_query_param("start", "2024-06-10T00:00:00-04:00")
        .add_query_param("end", "2024-06-17T00:00:00-04:00")
        .await
        .json();
    assert!(next_week.is_empty());
}

#[tokio::test]
async fn test_stats() {
    let ctx = TestContext::new();
    ctx.book(HAIRCUT, "2024-06-04", "12:00").await;
    ctx.book(HAIRCUT, "2024-06-04", "12:30").await;
    ctx.book(LINES, "2024-06-05", "12:00").await;

    let unbounded: Value = ctx.server.get("/panel/stats").await.json();
    assert_eq!(unbounded, json!({ "labels": [], "values": [] }));

    let stats: Value = ctx
        .server
        .get("/panel/stats")
        .add_query_param("start", "2024-06-03")
        .add_query_param("end", "2024-06-10")
        .await
        .json();
    assert_eq!(stats, json!({ "labels": [HAIRCUT, LINES], "values": [2, 1] }));
}

#[tokio::test]
async fn test_cancelled_rows() {
    let ctx = TestContext::new();
    let id = ctx.book(HAIRCUT, "2024-06-06", "18:00").await;
    ctx.server
        .post(&status_path(id))
        .json(&json!({ "status": "cancelled" }))
        .await
        .assert_status_ok();

    let body: Value = ctx
        .server
        .get("/panel/cancelled")
        .add_query_param("start", "2024-06-03")
        .add_query_param("end", "2024-06-10")
        .await
        .json();

    assert_eq!(
        body,
        json!({ "rows": [{
            "name": "Juan Soto",
            "rut": "12.345.678-5",
            "date": "06-06-2024",
            "slot": "18:00",
            "service": HAIRCUT,
        }] })
    );
}

#[tokio::test]
async fn test_csv_export() {
    let ctx = TestContext::new();
    let id = ctx.book(HAIRCUT, "2024-06-04", "12:00").await;
    ctx.book(HAIRCUT, "2024-06-05", "12:00").await;

    let response = ctx
        .server
        .get("/panel/export.csv")
        .add_query_param("start", "2024-06-03")
        .add_query_param("end", "2024-06-05")
        .await;

    response.assert_status_ok();
    assert_eq!(
        response.header("content-type").to_str().unwrap(),
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.header("content-disposition").to_str().unwrap(),
        "attachment; filename=\"appointments_20240603_20240605.csv\""
    );

    let text = response.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "ID,Date,Time,Client,RUT,Phone,Service,Day,Status");
    assert_eq!(
        lines[1],
        format!(
            "{},2024-06-04,12:00,Juan Soto,12.345.678-5,+56912345678,Corte de pelo,Martes,Pending",
            id
        )
    );
    assert_eq!(lines.len(), 2);
}

#[tokio::test]
async fn test_csv_export_requires_range() {
    let ctx = TestContext::new();

    let missing = ctx
        .server
        .get("/panel/export.csv")
        .add_query_param("start", "2024-06-03")
        .await;
    missing.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(missing.json::<Value>()["error"], "Missing required fields: end");

    let invalid = ctx
        .server
        .get("/panel/export.csv")
        .add_query_param("start", "2024-06-03")
        .add_query_param("end", "10/06/2024")
        .await;
    invalid.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(invalid.json::<Value>()["error"], "Invalid date: 10/06/2024");
}

#[tokio::test]
async fn test_closure_lifecycle() {
    let ctx = TestContext::new();

    let created = ctx
        .server
        .post("/panel/closures")
        .json(&json!({ "date": "2024-06-07", "reason": "Capacitación" }))
        .await;
    created.assert_status(StatusCode::CREATED);
    assert_eq!(created.json::<Value>()["reason"], "Capacitación");

    let closures: Vec<Value> = ctx.server.get("/panel/closures").await.json();
    assert_eq!(closures.len(), 1);
    assert_eq!(closures[0]["date"], "2024-06-07");

    let slots: Value = ctx
        .server
        .get("/api/slots")
        .add_query_param("date", "2024-06-07")
        .add_query_param("service", ctx.service_id(HAIRCUT))
        .await
        .json();
    assert_eq!(slots, json!({ "slots": [] }));

    let booking = ctx
        .server
        .post("/api/appointments")
        .json(&ctx.booking_body(HAIRCUT, "2024-06-07", "12:00"))
        .await;
    booking.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        booking.json::<Value>()["error"],
        "The shop is closed on 07-06-2024. Please pick another date"
    );

    ctx.server
        .delete("/panel/closures/2024-06-07")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    ctx.server
        .delete("/panel/closures/2024-06-07")
        .await
        .assert_status(StatusCode::NOT_FOUND);

    ctx.book(HAIRCUT, "2024-06-07", "12:00").await;
}

#[tokio::test]
async fn test_close_with_bad_date() {
    let ctx = TestContext::new();

    ctx.server
        .post("/panel/closures")
        .json(&json!({ "date": "someday" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}
