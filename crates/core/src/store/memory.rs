use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc, Weekday};
use eyre::eyre;
use uuid::Uuid;

use super::{CatalogStore, ClosureStore, ReservationStore};
use crate::errors::{BookingError, BookingResult};
use crate::models::{
    appointment::{Appointment, AppointmentDetail, AppointmentStatus, Client, NewBooking},
    catalog::{
        Day, OPERATING_WEEKDAYS, SEED_SERVICES, ServiceCategory, ServiceType, SlotLabel, day_name,
        opening_slots,
    },
    closure::ClosedDate,
    report::{AppointmentFilter, ServiceCount},
};

#[derive(Default)]
struct Inner {
    days: Vec<Day>,
    services: Vec<ServiceType>,
    closures: BTreeMap<NaiveDate, ClosedDate>,
    clients: HashMap<Uuid, Client>,
    appointments: Vec<Appointment>,
}

impl Inner {
    fn service(&self, id: Uuid) -> BookingResult<ServiceType> {
        self.services
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| BookingError::Storage(eyre!("dangling service reference {}", id)))
    }

    fn detail(&self, appointment: &Appointment) -> BookingResult<AppointmentDetail> {
        let client = self.clients.get(&appointment.client_id).ok_or_else(|| {
            BookingError::Storage(eyre!("dangling client reference {}", appointment.client_id))
        })?;
        let extras = appointment
            .extra_ids
            .iter()
            .map(|id| self.service(*id))
            .collect::<BookingResult<Vec<_>>>()?;

        Ok(AppointmentDetail {
            id: appointment.id,
            date: appointment.date,
            slot: appointment.slot,
            day: appointment.day.clone(),
            status: appointment.status,
            client_name: client.name.clone(),
            client_rut: client.rut.clone(),
            client_phone: client.phone.clone(),
            service: self.service(appointment.service_id)?,
            extras,
        })
    }

    fn slot_taken(&self, date: NaiveDate, slot: SlotLabel, excluding: Option<Uuid>) -> bool {
        self.appointments.iter().any(|a| {
            a.date == date
                && a.slot == slot
                && a.status.occupies_slot()
                && Some(a.id) != excluding
        })
    }

    fn matching(&self, filter: &AppointmentFilter) -> Vec<&Appointment> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut rows: Vec<&Appointment> = self
            .appointments
            .iter()
            .filter(|a| filter.start.is_none_or(|start| a.date >= start))
            .filter(|a| filter.end.is_none_or(|end| a.date < end))
            .filter(|a| filter.date.is_none_or(|date| a.date == date))
            .filter(|a| filter.weekday.is_none_or(|weekday| a.date.weekday() == weekday))
            .filter(|a| filter.service_id.is_none_or(|id| a.service_id == id))
            .filter(|a| filter.status.is_none_or(|status| a.status == status))
            .filter(|a| match (&search, self.clients.get(&a.client_id)) {
                (None, _) => true,
                (Some(needle), Some(client)) => {
                    client.name.to_lowercase().contains(needle)
                        || client.rut.to_lowercase().contains(needle)
                }
                (Some(_), None) => false,
            })
            .collect();
        rows.sort_by_key(|a| (a.date, a.slot));
        rows
    }
}

/// In-process store with the same semantics as the PostgreSQL one.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-loaded with the operating days and the default service catalog.
    pub fn seeded() -> Self {
        let store = Self::new();
        if let Ok(mut inner) = store.inner.lock() {
            inner.days = OPERATING_WEEKDAYS
                .iter()
                .map(|weekday| Day {
                    id: Uuid::new_v4(),
                    name: day_name(*weekday).to_string(),
                    weekday: *weekday,
                })
                .collect();
            inner.services = SEED_SERVICES
                .iter()
                .map(|seed| ServiceType {
                    id: Uuid::new_v4(),
                    name: seed.name.to_string(),
                    price: seed.price,
                    category: seed.category,
                    duration_minutes: seed.duration_minutes(),
                })
                .collect();
        }
        store
    }

    fn inner(&self) -> BookingResult<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| BookingError::Storage(eyre!("memory store lock poisoned")))
    }

    pub fn add_service(
        &self,
        name: &str,
        price: u32,
        category: ServiceCategory,
        duration_minutes: u32,
    ) -> BookingResult<ServiceType> {
        let service = ServiceType {
            id: Uuid::new_v4(),
            name: name.to_string(),
            price,
            category,
            duration_minutes,
        };
        self.inner()?.services.push(service.clone());
        Ok(service)
    }

    pub fn service_named(&self, name: &str) -> Option<ServiceType> {
        self.inner()
            .ok()?
            .services
            .iter()
            .find(|s| s.name == name)
            .cloned()
    }

    /// Snapshot of every stored appointment, cancelled ones included.
    pub fn appointments(&self) -> Vec<Appointment> {
        self.inner()
            .map(|inner| inner.appointments.clone())
            .unwrap_or_default()
    }

    pub fn client_count(&self) -> usize {
        self.inner().map(|inner| inner.clients.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn list_days(&self) -> BookingResult<Vec<Day>> {
        Ok(self.inner()?.days.clone())
    }

    async fn day_for_weekday(&self, weekday: Weekday) -> BookingResult<Option<Day>> {
        Ok(self
            .inner()?
            .days
            .iter()
            .find(|d| d.weekday == weekday)
            .cloned())
    }

    async fn slots_for_weekday(&self, weekday: Weekday) -> BookingResult<Vec<SlotLabel>> {
        let has_day = self.inner()?.days.iter().any(|d| d.weekday == weekday);
        Ok(if has_day {
            opening_slots(weekday)
        } else {
            Vec::new()
        })
    }

    async fn list_services(&self) -> BookingResult<Vec<ServiceType>> {
        let mut services = self.inner()?.services.clone();
        services.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<ServiceType>> {
        Ok(self.inner()?.services.iter().find(|s| s.id == id).cloned())
    }
}

#[async_trait]
impl ClosureStore for MemoryStore {
    async fn is_closed(&self, date: NaiveDate) -> BookingResult<bool> {
        Ok(self.inner()?.closures.contains_key(&date))
    }

    async fn close_date(
        &self,
        date: NaiveDate,
        reason: Option<String>,
    ) -> BookingResult<ClosedDate> {
        let mut inner = self.inner()?;
        let closure = inner.closures.entry(date).or_insert_with(|| ClosedDate {
            date,
            reason,
            created_at: Utc::now(),
        });
        Ok(closure.clone())
    }

    async fn reopen_date(&self, date: NaiveDate) -> BookingResult<bool> {
        Ok(self.inner()?.closures.remove(&date).is_some())
    }

    async fn list_closures(&self, from: NaiveDate) -> BookingResult<Vec<ClosedDate>> {
        Ok(self
            .inner()?
            .closures
            .range(from..)
            .map(|(_, closure)| closure.clone())
            .collect())
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn occupied_slots(&self, date: NaiveDate) -> BookingResult<Vec<SlotLabel>> {
        let mut slots: Vec<SlotLabel> = self
            .inner()?
            .appointments
            .iter()
            .filter(|a| a.date == date && a.status.occupies_slot())
            .map(|a| a.slot)
            .collect();
        slots.sort();
        Ok(slots)
    }

    async fn is_slot_taken(
        &self,
        date: NaiveDate,
        slot: SlotLabel,
        excluding: Option<Uuid>,
    ) -> BookingResult<bool> {
        Ok(self.inner()?.slot_taken(date, slot, excluding))
    }

    async fn insert_booking(&self, booking: NewBooking) -> BookingResult<Appointment> {
        let mut inner = self.inner()?;
        if inner.slot_taken(booking.date, booking.slot, None) {
            return Err(BookingError::SlotTaken(booking.slot.to_string()));
        }

        let now = Utc::now();
        let client = Client {
            id: Uuid::new_v4(),
            name: booking.client.name,
            phone: booking.client.phone,
            rut: booking.client.rut,
            created_at: now,
        };
        let appointment = Appointment {
            id: Uuid::new_v4(),
            client_id: client.id,
            service_id: booking.service_id,
            extra_ids: booking.extra_ids,
            day: booking.day.name,
            date: booking.date,
            slot: booking.slot,
            status: AppointmentStatus::Pending,
            created_at: now,
        };

        inner.clients.insert(client.id, client);
        inner.appointments.push(appointment.clone());
        Ok(appointment)
    }

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        Ok(self
            .inner()?
            .appointments
            .iter()
            .find(|a| a.id == id)
            .cloned())
    }

    async fn get_appointment_detail(&self, id: Uuid) -> BookingResult<Option<AppointmentDetail>> {
        let inner = self.inner()?;
        match inner.appointments.iter().find(|a| a.id == id) {
            Some(appointment) => inner.detail(appointment).map(Some),
            None => Ok(None),
        }
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        let mut inner = self.inner()?;
        let (date, slot) = inner
            .appointments
            .iter()
            .find(|a| a.id == id)
            .map(|a| (a.date, a.slot))
            .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;

        if status.occupies_slot() && inner.slot_taken(date, slot, Some(id)) {
            return Err(BookingError::SlotConflict(slot.to_string()));
        }

        let appointment = inner
            .appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;
        appointment.status = status;
        Ok(appointment.clone())
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<AppointmentDetail>> {
        let inner = self.inner()?;
        inner
            .matching(filter)
            .into_iter()
            .map(|a| inner.detail(a))
            .collect()
    }

    async fn count_by_service(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<ServiceCount>> {
        let inner = self.inner()?;
        let mut totals: HashMap<String, i64> = HashMap::new();
        for appointment in inner.matching(filter) {
            let service = inner.service(appointment.service_id)?;
            *totals.entry(service.name).or_default() += 1;
        }

        let mut counts: Vec<ServiceCount> = totals
            .into_iter()
            .map(|(service, total)| ServiceCount { service, total })
            .collect();
        counts.sort_by(|a, b| b.total.cmp(&a.total).then_with(|| a.service.cmp(&b.service)));
        Ok(counts)
    }
}
