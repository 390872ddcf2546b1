#![allow(dead_code)]

use std::sync::Arc;

use barbershop_core::booking::BookingService;
use barbershop_core::clock::FixedClock;
use barbershop_core::models::appointment::BookingRequest;
use barbershop_core::models::catalog::ServiceType;
use barbershop_core::reporting::ReportingService;
use barbershop_core::store::{Stores, memory::MemoryStore};
use chrono::NaiveDate;

pub const HAIRCUT: &str = "Corte de pelo";
pub const BEARD: &str = "Perfilado de barba";
pub const LINES: &str = "Líneas";

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").unwrap()
}

pub fn clock_at(day: &str, hour: u32, minute: u32) -> Arc<FixedClock> {
    Arc::new(FixedClock::new(
        date(day).and_hms_opt(hour, minute, 0).unwrap(),
    ))
}

pub struct TestContext {
    pub store: Arc<MemoryStore>,
    pub booking: BookingService,
    pub reporting: ReportingService,
}

impl TestContext {
    /// Seeded store with the clock frozen on Monday 2024-06-03 at `hour`:`minute`.
    pub fn monday_at(hour: u32, minute: u32) -> Self {
        Self::at("2024-06-03", hour, minute)
    }

    pub fn at(day: &str, hour: u32, minute: u32) -> Self {
        let store = Arc::new(MemoryStore::seeded());
        let stores = Stores::shared(store.clone());
        let clock = clock_at(day, hour, minute);
        Self {
            booking: BookingService::new(stores.clone(), clock.clone()),
            reporting: ReportingService::new(stores, clock),
            store,
        }
    }

    pub fn service(&self, name: &str) -> ServiceType {
        self.store.service_named(name).unwrap()
    }

    pub fn request(&self, service: &str, day: &str, slot: &str) -> BookingRequest {
        BookingRequest {
            name: Some("Juan Soto".to_string()),
            phone: Some("912345678".to_string()),
            rut: Some("12.345.678-5".to_string()),
            service_id: Some(self.service(service).id.to_string()),
            date: Some(day.to_string()),
            slot: Some(slot.to_string()),
            extras: Vec::new(),
        }
    }
}
