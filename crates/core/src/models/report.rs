use chrono::{NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::appointment::{AppointmentDetail, AppointmentStatus};
use crate::models::catalog::{ServiceType, SlotLabel};

/// Filters shared by the panel listings, stats and exports.
///
/// `end` is exclusive. `search` matches the client name or RUT, ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentFilter {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub date: Option<NaiveDate>,
    pub weekday: Option<Weekday>,
    pub service_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServiceCount {
    pub service: String,
    pub total: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub labels: Vec<String>,
    pub values: Vec<i64>,
}

impl From<Vec<ServiceCount>> for StatsResponse {
    fn from(counts: Vec<ServiceCount>) -> Self {
        let (labels, values) = counts.into_iter().map(|c| (c.service, c.total)).unzip();
        Self { labels, values }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarEvent {
    pub id: Uuid,
    pub title: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub color: String,
    #[serde(rename = "extendedProps")]
    pub details: EventDetails,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventDetails {
    pub status: String,
    pub service: String,
    pub slot: SlotLabel,
    pub weekday: String,
    pub rut: String,
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CancelledRow {
    pub name: String,
    pub rut: String,
    pub date: String,
    pub slot: SlotLabel,
    pub service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OccupiedSlot {
    pub day: String,
    pub date: String,
    pub slot: SlotLabel,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WeekDay {
    pub date: NaiveDate,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub label: String,
    pub week: Vec<WeekDay>,
    pub appointments: Vec<AppointmentDetail>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Receipt {
    pub appointment_id: Uuid,
    pub client_name: String,
    pub rut: String,
    pub date: String,
    pub slot: SlotLabel,
    pub service: String,
    pub extras: Vec<String>,
    pub total: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReservableWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl ReservableWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookingContext {
    pub services: Vec<ServiceType>,
    pub operating_days: Vec<String>,
    pub today: NaiveDate,
    pub today_name: String,
    pub today_closed: bool,
    pub window: ReservableWindow,
}
