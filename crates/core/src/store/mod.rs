//! Persistence seams used by the booking engine.
//!
//! `barbershop-db` implements these traits over PostgreSQL; [`memory::MemoryStore`]
//! implements them in process and enforces the same one-active-appointment-per-slot
//! rule.

pub mod memory;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Weekday};
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::{
    appointment::{Appointment, AppointmentDetail, AppointmentStatus, NewBooking},
    catalog::{Day, ServiceType, SlotLabel},
    closure::ClosedDate,
    report::{AppointmentFilter, ServiceCount},
};

/// Reference data: operating days, their slots and the service catalog.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_days(&self) -> BookingResult<Vec<Day>>;

    async fn day_for_weekday(&self, weekday: Weekday) -> BookingResult<Option<Day>>;

    /// Ordered slots offered on `weekday`. Empty when the shop does not open.
    async fn slots_for_weekday(&self, weekday: Weekday) -> BookingResult<Vec<SlotLabel>>;

    async fn list_services(&self) -> BookingResult<Vec<ServiceType>>;

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<ServiceType>>;
}

/// Dates on which nothing can be booked.
#[async_trait]
pub trait ClosureStore: Send + Sync {
    async fn is_closed(&self, date: NaiveDate) -> BookingResult<bool>;

    /// Marks `date` closed. Closing an already closed date returns the existing record.
    async fn close_date(&self, date: NaiveDate, reason: Option<String>)
    -> BookingResult<ClosedDate>;

    /// Returns false when the date was not closed.
    async fn reopen_date(&self, date: NaiveDate) -> BookingResult<bool>;

    async fn list_closures(&self, from: NaiveDate) -> BookingResult<Vec<ClosedDate>>;
}

/// Appointments and their clients.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Slots held by pending or attended appointments on `date`.
    async fn occupied_slots(&self, date: NaiveDate) -> BookingResult<Vec<SlotLabel>>;

    async fn is_slot_taken(
        &self,
        date: NaiveDate,
        slot: SlotLabel,
        excluding: Option<Uuid>,
    ) -> BookingResult<bool>;

    /// Stores the client and a pending appointment in one unit of work.
    ///
    /// Fails with `SlotTaken` when another active appointment already holds
    /// the slot at commit time.
    async fn insert_booking(&self, booking: NewBooking) -> BookingResult<Appointment>;

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>>;

    async fn get_appointment_detail(&self, id: Uuid) -> BookingResult<Option<AppointmentDetail>>;

    /// Fails with `SlotConflict` when the change would put a second active
    /// appointment on the same slot.
    async fn update_status(&self, id: Uuid, status: AppointmentStatus)
    -> BookingResult<Appointment>;

    /// Matching appointments ordered by date, then slot.
    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<AppointmentDetail>>;

    /// Appointment counts per service, largest first, ties by name.
    async fn count_by_service(&self, filter: &AppointmentFilter)
    -> BookingResult<Vec<ServiceCount>>;
}

/// The three stores the services work against.
#[derive(Clone)]
pub struct Stores {
    pub catalog: Arc<dyn CatalogStore>,
    pub closures: Arc<dyn ClosureStore>,
    pub reservations: Arc<dyn ReservationStore>,
}

impl Stores {
    /// Uses one backend for all three concerns.
    pub fn shared<S>(store: Arc<S>) -> Self
    where
        S: CatalogStore + ClosureStore + ReservationStore + 'static,
    {
        Self {
            catalog: store.clone(),
            closures: store.clone(),
            reservations: store,
        }
    }
}
