use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::models::catalog::{Day, ServiceType, SlotLabel};
use crate::{phone, rut};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pending,
    Attended,
    Cancelled,
}

impl AppointmentStatus {
    /// Single-character code used in storage.
    pub fn code(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "P",
            AppointmentStatus::Attended => "A",
            AppointmentStatus::Cancelled => "C",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Attended => "Attended",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Pending and attended appointments hold their slot; cancelled ones do not.
    pub fn occupies_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for AppointmentStatus {
    type Err = BookingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "p" | "pending" => Ok(AppointmentStatus::Pending),
            "a" | "attended" => Ok(AppointmentStatus::Attended),
            "c" | "cancelled" | "canceled" => Ok(AppointmentStatus::Cancelled),
            _ => Err(BookingError::InvalidStatus(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub rut: String,
    pub created_at: DateTime<Utc>,
}

/// A client that passed validation and is ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub name: String,
    pub phone: String,
    pub rut: String,
}

impl NewClient {
    /// Validates the RUT and canonicalizes both the RUT and the phone number.
    pub fn build(name: &str, phone: &str, rut: &str) -> BookingResult<Self> {
        if !rut::validate(rut) {
            return Err(BookingError::InvalidRut(rut.to_string()));
        }

        Ok(Self {
            name: name.trim().to_string(),
            phone: phone::canonicalize(phone),
            rut: rut::canonicalize(rut),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub client_id: Uuid,
    pub service_id: Uuid,
    pub extra_ids: Vec<Uuid>,
    pub day: String,
    pub date: NaiveDate,
    pub slot: SlotLabel,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

/// Everything the store needs to commit one booking atomically.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub client: NewClient,
    pub service_id: Uuid,
    pub extra_ids: Vec<Uuid>,
    pub day: Day,
    pub date: NaiveDate,
    pub slot: SlotLabel,
}

/// Booking form payload. Every field is optional on the wire so that missing
/// values surface as a booking error instead of a deserialization failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub rut: Option<String>,
    pub service_id: Option<String>,
    pub date: Option<String>,
    pub slot: Option<String>,
    #[serde(default)]
    pub extras: Vec<String>,
}

/// Appointment joined with its client, service, day and extras.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AppointmentDetail {
    pub id: Uuid,
    pub date: NaiveDate,
    pub slot: SlotLabel,
    pub day: String,
    pub status: AppointmentStatus,
    pub client_name: String,
    pub client_rut: String,
    pub client_phone: String,
    pub service: ServiceType,
    pub extras: Vec<ServiceType>,
}

impl AppointmentDetail {
    /// Base service price plus every extra.
    pub fn total(&self) -> u32 {
        self.service.price + self.extras.iter().map(|extra| extra.price).sum::<u32>()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    pub status: String,
}
