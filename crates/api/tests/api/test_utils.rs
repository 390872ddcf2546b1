use std::sync::Arc;

use axum_test::TestServer;
use barbershop_api::{ApiState, build_router};
use barbershop_core::clock::FixedClock;
use barbershop_core::store::{Stores, memory::MemoryStore};
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::{Value, json};
use uuid::Uuid;

pub const HAIRCUT: &str = "Corte de pelo";
pub const LINES: &str = "Líneas";

/// Monday 2024-06-03, 09:00 shop time.
pub fn monday_morning() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 3)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap()
}

pub fn server_with(stores: Stores, now: NaiveDateTime) -> TestServer {
    let state = Arc::new(ApiState::new(stores, Arc::new(FixedClock::new(now))));
    TestServer::new(build_router(state)).unwrap()
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub server: TestServer,
}

impl TestContext {
    pub fn new() -> Self {
        Self::at(monday_morning())
    }

    pub fn at(now: NaiveDateTime) -> Self {
        let store = Arc::new(MemoryStore::seeded());
        let server = server_with(Stores::shared(store.clone()), now);
        Self { store, server }
    }

    pub fn service_id(&self, name: &str) -> Uuid {
        self.store.service_named(name).unwrap().id
    }

    pub fn booking_body(&self, service: &str, date: &str, slot: &str) -> Value {
        json!({
            "name": "Juan Soto",
            "phone": "9 1234 5678",
            "rut": "12.345.678-5",
            "service_id": self.service_id(service),
            "date": date,
            "slot": slot,
        })
    }

    /// Books and returns the new appointment id.
    pub async fn book(&self, service: &str, date: &str, slot: &str) -> Uuid {
        let response = self
            .server
            .post("/api/appointments")
            .json(&self.booking_body(service, date, slot))
            .await;
        response.assert_status(axum::http::StatusCode::CREATED);
        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }
}
