//! # Booking engine
//!
//! Computes bookable slots and commits appointments.
//!
//! ## Slot computation
//!
//! For a date and a service:
//!
//! 1. Sundays, closed dates and dates outside the reservable window have no slots
//! 2. The weekday's ordered slot list is loaded from the catalog
//! 3. Slots held by pending or attended appointments are removed
//! 4. On the current date, slots not strictly after the current minute are removed
//! 5. Services longer than one slot keep only starts whose following slots are free too
//!
//! ## Booking
//!
//! A booking re-runs the computation while holding the (date, slot) lock and
//! re-checks occupancy directly before the store commits. The store rejects a
//! second active appointment on the same slot at commit time, which covers
//! concurrent writers outside this process.

pub mod availability;
pub mod calendar;
pub mod locks;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::clock::Clock;
use crate::errors::{BookingError, BookingResult};
use crate::models::{
    appointment::{Appointment, AppointmentStatus, BookingRequest, NewBooking, NewClient},
    catalog::{ServiceCategory, ServiceType, SlotLabel, day_name, is_operating_weekday},
    report::{OccupiedSlot, ReservableWindow},
};
use crate::store::Stores;

use self::calendar::{display_date, parse_date, reservable_window};
use self::locks::SlotLocks;

/// Required booking fields after presence checks.
struct BookingFields<'a> {
    name: &'a str,
    phone: &'a str,
    rut: &'a str,
    service_id: &'a str,
    date: &'a str,
    slot: &'a str,
}

impl<'a> BookingFields<'a> {
    fn from_request(request: &'a BookingRequest) -> BookingResult<Self> {
        fn present(value: &Option<String>) -> Option<&str> {
            value.as_deref().map(str::trim).filter(|v| !v.is_empty())
        }

        let fields = [
            ("name", present(&request.name)),
            ("phone", present(&request.phone)),
            ("rut", present(&request.rut)),
            ("service_id", present(&request.service_id)),
            ("date", present(&request.date)),
            ("slot", present(&request.slot)),
        ];

        let missing: Vec<&str> = fields
            .iter()
            .filter(|(_, value)| value.is_none())
            .map(|(field, _)| *field)
            .collect();
        if !missing.is_empty() {
            return Err(BookingError::MissingFields(missing.join(", ")));
        }

        let [name, phone, rut, service_id, date, slot] = fields.map(|(_, v)| v.unwrap_or_default());
        Ok(Self {
            name,
            phone,
            rut,
            service_id,
            date,
            slot,
        })
    }
}

#[derive(Clone)]
pub struct BookingService {
    stores: Stores,
    clock: Arc<dyn Clock>,
    locks: SlotLocks,
}

impl BookingService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self {
            stores,
            clock,
            locks: SlotLocks::new(),
        }
    }

    pub fn reservable_window(&self) -> ReservableWindow {
        reservable_window(self.clock.today())
    }

    /// Bookable start slots for `service_id` on `date`, in day order.
    ///
    /// Never fails for "nothing available"; only an unknown service or a
    /// storage failure is an error.
    pub async fn available_slots(
        &self,
        date: NaiveDate,
        service_id: Uuid,
    ) -> BookingResult<Vec<SlotLabel>> {
        if !self.accepts_bookings_on(date).await? {
            debug!("No slots on {}: not a bookable date", date);
            return Ok(Vec::new());
        }

        let service = self
            .stores
            .catalog
            .get_service(service_id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Service with ID {} not found", service_id)))?;

        self.slots_for_service(date, &service).await
    }

    /// [`available_slots`](Self::available_slots) over raw query strings.
    pub async fn available_slots_for_query(
        &self,
        date: &str,
        service_id: &str,
    ) -> BookingResult<Vec<SlotLabel>> {
        let date = parse_date(date)?;
        let service_id = Uuid::parse_str(service_id.trim())
            .map_err(|_| BookingError::NotFound(format!("Service with ID {} not found", service_id)))?;
        self.available_slots(date, service_id).await
    }

    /// Slots currently held on `date`, for the public occupancy listing.
    pub async fn occupied_slots(&self, date: NaiveDate) -> BookingResult<Vec<OccupiedSlot>> {
        let day = day_name(date.weekday()).to_string();
        let shown = display_date(date);
        Ok(self
            .stores
            .reservations
            .occupied_slots(date)
            .await?
            .into_iter()
            .map(|slot| OccupiedSlot {
                day: day.clone(),
                date: shown.clone(),
                slot,
            })
            .collect())
    }

    async fn accepts_bookings_on(&self, date: NaiveDate) -> BookingResult<bool> {
        if !is_operating_weekday(date.weekday()) || !self.reservable_window().contains(date) {
            return Ok(false);
        }
        Ok(!self.stores.closures.is_closed(date).await?)
    }

    async fn slots_for_service(
        &self,
        date: NaiveDate,
        service: &ServiceType,
    ) -> BookingResult<Vec<SlotLabel>> {
        let day_slots = self.stores.catalog.slots_for_weekday(date.weekday()).await?;
        let occupied: HashSet<SlotLabel> = self
            .stores
            .reservations
            .occupied_slots(date)
            .await?
            .into_iter()
            .collect();

        let now = self.clock.now();
        let cutoff = (date == now.date()).then(|| now.time());

        let free = availability::free_slots(&day_slots, &occupied, cutoff);
        Ok(availability::bookable_starts(&day_slots, &free, service.slots_needed()))
    }

    /// Validates and commits a booking, returning the pending appointment.
    pub async fn book_appointment(&self, request: BookingRequest) -> BookingResult<Appointment> {
        match self.try_book(&request).await {
            Ok(appointment) => {
                info!(
                    "Booked appointment {} on {} at {}",
                    appointment.id, appointment.date, appointment.slot
                );
                self.locks.prune_before(self.clock.today());
                Ok(appointment)
            }
            Err(e) if e.is_validation() => {
                warn!(
                    "Booking rejected for {:?} at {:?}: {}",
                    request.date, request.slot, e
                );
                Err(e)
            }
            Err(e) => {
                error!("Booking failed: {}", e);
                Err(e)
            }
        }
    }

    async fn try_book(&self, request: &BookingRequest) -> BookingResult<Appointment> {
        let fields = BookingFields::from_request(request)?;

        let date = parse_date(fields.date)?;

        if self.stores.closures.is_closed(date).await? {
            return Err(BookingError::DayClosed(display_date(date)));
        }

        let window = self.reservable_window();
        if !window.contains(date) {
            return Err(BookingError::OutOfWindow {
                from: display_date(window.from),
                to: display_date(window.to),
            });
        }

        let weekday = date.weekday();
        let closed_weekday = || BookingError::ClosedWeekday(day_name(weekday).to_string());
        if !is_operating_weekday(weekday) {
            return Err(closed_weekday());
        }
        let day = self
            .stores
            .catalog
            .day_for_weekday(weekday)
            .await?
            .ok_or_else(closed_weekday)?;

        let service = self.resolve_service(fields.service_id).await?;
        let mut extra_ids = Vec::with_capacity(request.extras.len());
        for raw in &request.extras {
            let extra = self.resolve_service(raw).await?;
            if extra.category != ServiceCategory::Addon {
                return Err(BookingError::UnknownService(format!(
                    "{} is not an add-on",
                    extra.name
                )));
            }
            if !extra_ids.contains(&extra.id) {
                extra_ids.push(extra.id);
            }
        }

        let slot: SlotLabel = fields
            .slot
            .parse()
            .map_err(|_| BookingError::SlotUnavailable(fields.slot.to_string()))?;

        let _guard = self.locks.acquire(date, slot).await;

        let available = self.slots_for_service(date, &service).await?;
        if !available.contains(&slot) {
            if self
                .stores
                .reservations
                .is_slot_taken(date, slot, None)
                .await?
            {
                return Err(BookingError::SlotTaken(slot.to_string()));
            }
            return Err(BookingError::SlotUnavailable(slot.to_string()));
        }

        if self
            .stores
            .reservations
            .is_slot_taken(date, slot, None)
            .await?
        {
            return Err(BookingError::SlotTaken(slot.to_string()));
        }

        let client = NewClient::build(fields.name, fields.phone, fields.rut)?;

        self.stores
            .reservations
            .insert_booking(NewBooking {
                client,
                service_id: service.id,
                extra_ids,
                day,
                date,
                slot,
            })
            .await
    }

    async fn resolve_service(&self, raw: &str) -> BookingResult<ServiceType> {
        let id = Uuid::parse_str(raw.trim())
            .map_err(|_| BookingError::UnknownService(raw.to_string()))?;
        self.stores
            .catalog
            .get_service(id)
            .await?
            .ok_or_else(|| BookingError::UnknownService(raw.to_string()))
    }

    /// Panel action: moves an appointment to another status.
    ///
    /// Reactivating a cancelled appointment fails with `SlotConflict` when the
    /// slot has since been taken.
    pub async fn set_status(&self, id: Uuid, raw_status: &str) -> BookingResult<Appointment> {
        let status: AppointmentStatus = raw_status.parse()?;

        let appointment = self
            .stores
            .reservations
            .get_appointment(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

        if appointment.status == status {
            return Ok(appointment);
        }

        let updated = if !appointment.status.occupies_slot() && status.occupies_slot() {
            let _guard = self.locks.acquire(appointment.date, appointment.slot).await;
            if self
                .stores
                .reservations
                .is_slot_taken(appointment.date, appointment.slot, Some(id))
                .await?
            {
                warn!(
                    "Refusing to reactivate {}: {} at {} is taken",
                    id, appointment.date, appointment.slot
                );
                return Err(BookingError::SlotConflict(appointment.slot.to_string()));
            }
            self.stores.reservations.update_status(id, status).await?
        } else {
            self.stores.reservations.update_status(id, status).await?
        };

        info!(
            "Appointment {} moved from {} to {}",
            id, appointment.status, updated.status
        );
        Ok(updated)
    }
}
