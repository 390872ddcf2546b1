use barbershop_core::models::{
    appointment::{Appointment, AppointmentStatus},
    catalog::{Day, ServiceCategory, ServiceType, SlotLabel, legacy_duration_minutes},
    closure::ClosedDate,
    report::ServiceCount,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbDay {
    pub id: Uuid,
    pub name: String,
    /// ISO weekday number, Monday = 1.
    pub weekday: i16,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServiceType {
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub category: String,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbClosedDate {
    pub date: NaiveDate,
    pub reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_type_id: Uuid,
    pub day_name: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Appointment joined with its client and main service.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentDetail {
    pub id: Uuid,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub day_name: String,
    pub status: String,
    pub client_name: String,
    pub client_rut: String,
    pub client_phone: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub service_price: i32,
    pub service_category: String,
    pub service_duration: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointmentExtra {
    pub appointment_id: Uuid,
    pub id: Uuid,
    pub name: String,
    pub price: i32,
    pub category: String,
    pub duration_minutes: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbServiceCount {
    pub service: String,
    pub total: i64,
}

pub(crate) fn weekday_from_iso(number: i16) -> Result<Weekday> {
    u8::try_from(number - 1)
        .ok()
        .and_then(|n| Weekday::try_from(n).ok())
        .ok_or_else(|| eyre!("invalid weekday number {}", number))
}

pub(crate) fn slot_from_time(time: NaiveTime) -> Result<SlotLabel> {
    SlotLabel::from_time(time).ok_or_else(|| eyre!("{} is not a half-hour slot", time))
}

pub(crate) fn parse_status(code: &str) -> Result<AppointmentStatus> {
    code.trim()
        .parse()
        .map_err(|e| eyre!("unexpected status '{}': {}", code, e))
}

fn service_type(
    id: Uuid,
    name: String,
    price: i32,
    category: &str,
    duration_minutes: Option<i32>,
) -> Result<ServiceType> {
    let category: ServiceCategory = category.parse().map_err(|e: String| eyre!(e))?;
    let duration_minutes = match duration_minutes {
        Some(minutes) => u32::try_from(minutes)?,
        None => legacy_duration_minutes(&name),
    };
    Ok(ServiceType {
        id,
        price: u32::try_from(price)?,
        name,
        category,
        duration_minutes,
    })
}

impl TryFrom<DbDay> for Day {
    type Error = eyre::Report;

    fn try_from(row: DbDay) -> Result<Self> {
        Ok(Day {
            id: row.id,
            name: row.name,
            weekday: weekday_from_iso(row.weekday)?,
        })
    }
}

impl TryFrom<DbServiceType> for ServiceType {
    type Error = eyre::Report;

    fn try_from(row: DbServiceType) -> Result<Self> {
        service_type(
            row.id,
            row.name,
            row.price,
            &row.category,
            row.duration_minutes,
        )
    }
}

impl TryFrom<DbAppointmentExtra> for ServiceType {
    type Error = eyre::Report;

    fn try_from(row: DbAppointmentExtra) -> Result<Self> {
        service_type(
            row.id,
            row.name,
            row.price,
            &row.category,
            row.duration_minutes,
        )
    }
}

impl From<DbClosedDate> for ClosedDate {
    fn from(row: DbClosedDate) -> Self {
        ClosedDate {
            date: row.date,
            reason: row.reason,
            created_at: row.created_at,
        }
    }
}

impl From<DbServiceCount> for ServiceCount {
    fn from(row: DbServiceCount) -> Self {
        ServiceCount {
            service: row.service,
            total: row.total,
        }
    }
}

impl DbAppointment {
    pub fn into_appointment(self, extra_ids: Vec<Uuid>) -> Result<Appointment> {
        Ok(Appointment {
            id: self.id,
            client_id: self.client_id,
            service_id: self.service_type_id,
            extra_ids,
            day: self.day_name,
            date: self.date,
            slot: slot_from_time(self.start_time)?,
            status: parse_status(&self.status)?,
            created_at: self.created_at,
        })
    }
}

impl DbAppointmentDetail {
    pub fn service(&self) -> Result<ServiceType> {
        service_type(
            self.service_id,
            self.service_name.clone(),
            self.service_price,
            &self.service_category,
            self.service_duration,
        )
    }
}
