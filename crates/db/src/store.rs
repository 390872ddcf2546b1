use std::collections::HashMap;

use async_trait::async_trait;
use barbershop_core::errors::{BookingError, BookingResult};
use barbershop_core::models::{
    appointment::{Appointment, AppointmentDetail, AppointmentStatus, NewBooking},
    catalog::{Day, ServiceType, SlotLabel},
    closure::ClosedDate,
    report::{AppointmentFilter, ServiceCount},
};
use barbershop_core::store::{CatalogStore, ClosureStore, ReservationStore};
use chrono::{NaiveDate, Weekday};
use eyre::Result;
use uuid::Uuid;

use crate::DbPool;
use crate::models::{DbAppointment, DbAppointmentDetail, parse_status, slot_from_time};
use crate::repositories::{
    appointment::{self, BookingInsert, StatusChange},
    catalog, closure,
};

/// PostgreSQL-backed implementation of the store traits.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn details(&self, rows: Vec<DbAppointmentDetail>) -> Result<Vec<AppointmentDetail>> {
        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut extras: HashMap<Uuid, Vec<ServiceType>> = HashMap::new();
        for extra in appointment::get_extras_for(&self.pool, &ids).await? {
            let owner = extra.appointment_id;
            extras.entry(owner).or_default().push(extra.try_into()?);
        }

        rows.into_iter()
            .map(|row| {
                let extras = extras.remove(&row.id).unwrap_or_default();
                into_detail(row, extras)
            })
            .collect()
    }

    async fn appointment(&self, row: DbAppointment) -> Result<Appointment> {
        let extra_ids = appointment::get_extra_ids(&self.pool, row.id).await?;
        row.into_appointment(extra_ids)
    }
}

fn into_detail(row: DbAppointmentDetail, extras: Vec<ServiceType>) -> Result<AppointmentDetail> {
    let service = row.service()?;
    Ok(AppointmentDetail {
        id: row.id,
        date: row.date,
        slot: slot_from_time(row.start_time)?,
        day: row.day_name,
        status: parse_status(&row.status)?,
        client_name: row.client_name,
        client_rut: row.client_rut,
        client_phone: row.client_phone,
        service,
        extras,
    })
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn list_days(&self) -> BookingResult<Vec<Day>> {
        let days = catalog::list_days(&self.pool)
            .await?
            .into_iter()
            .map(Day::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(days)
    }

    async fn day_for_weekday(&self, weekday: Weekday) -> BookingResult<Option<Day>> {
        let day = catalog::get_day_by_weekday(&self.pool, weekday)
            .await?
            .map(Day::try_from)
            .transpose()?;
        Ok(day)
    }

    async fn slots_for_weekday(&self, weekday: Weekday) -> BookingResult<Vec<SlotLabel>> {
        let slots = catalog::get_slot_times_for_weekday(&self.pool, weekday)
            .await?
            .into_iter()
            .map(slot_from_time)
            .collect::<Result<Vec<_>>>()?;
        Ok(slots)
    }

    async fn list_services(&self) -> BookingResult<Vec<ServiceType>> {
        let services = catalog::list_service_types(&self.pool)
            .await?
            .into_iter()
            .map(ServiceType::try_from)
            .collect::<Result<Vec<_>>>()?;
        Ok(services)
    }

    async fn get_service(&self, id: Uuid) -> BookingResult<Option<ServiceType>> {
        let service = catalog::get_service_type_by_id(&self.pool, id)
            .await?
            .map(ServiceType::try_from)
            .transpose()?;
        Ok(service)
    }
}

#[async_trait]
impl ClosureStore for PgStore {
    async fn is_closed(&self, date: NaiveDate) -> BookingResult<bool> {
        Ok(closure::is_date_closed(&self.pool, date).await?)
    }

    async fn close_date(
        &self,
        date: NaiveDate,
        reason: Option<String>,
    ) -> BookingResult<ClosedDate> {
        let row = closure::close_date(&self.pool, date, reason.as_deref()).await?;
        Ok(row.into())
    }

    async fn reopen_date(&self, date: NaiveDate) -> BookingResult<bool> {
        Ok(closure::reopen_date(&self.pool, date).await?)
    }

    async fn list_closures(&self, from: NaiveDate) -> BookingResult<Vec<ClosedDate>> {
        let rows = closure::list_closures_from(&self.pool, from).await?;
        Ok(rows.into_iter().map(ClosedDate::from).collect())
    }
}

#[async_trait]
impl ReservationStore for PgStore {
    async fn occupied_slots(&self, date: NaiveDate) -> BookingResult<Vec<SlotLabel>> {
        let slots = appointment::get_occupied_times(&self.pool, date)
            .await?
            .into_iter()
            .map(slot_from_time)
            .collect::<Result<Vec<_>>>()?;
        Ok(slots)
    }

    async fn is_slot_taken(
        &self,
        date: NaiveDate,
        slot: SlotLabel,
        excluding: Option<Uuid>,
    ) -> BookingResult<bool> {
        Ok(appointment::is_slot_taken(&self.pool, date, slot.time(), excluding).await?)
    }

    async fn insert_booking(&self, booking: NewBooking) -> BookingResult<Appointment> {
        match appointment::insert_booking(&self.pool, &booking).await? {
            BookingInsert::Inserted(row) => Ok(row.into_appointment(booking.extra_ids)?),
            BookingInsert::SlotTaken => Err(BookingError::SlotTaken(booking.slot.to_string())),
        }
    }

    async fn get_appointment(&self, id: Uuid) -> BookingResult<Option<Appointment>> {
        match appointment::get_appointment_by_id(&self.pool, id).await? {
            Some(row) => Ok(Some(self.appointment(row).await?)),
            None => Ok(None),
        }
    }

    async fn get_appointment_detail(&self, id: Uuid) -> BookingResult<Option<AppointmentDetail>> {
        let Some(row) = appointment::get_appointment_detail(&self.pool, id).await? else {
            return Ok(None);
        };
        Ok(self.details(vec![row]).await?.pop())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: AppointmentStatus,
    ) -> BookingResult<Appointment> {
        match appointment::update_status(&self.pool, id, status).await? {
            StatusChange::Updated(row) => Ok(self.appointment(row).await?),
            StatusChange::NotFound => Err(BookingError::NotFound(format!(
                "Appointment with ID {} not found",
                id
            ))),
            StatusChange::SlotConflict => {
                let slot = match appointment::get_appointment_by_id(&self.pool, id).await? {
                    Some(row) => slot_from_time(row.start_time)?.to_string(),
                    None => id.to_string(),
                };
                Err(BookingError::SlotConflict(slot))
            }
        }
    }

    async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<AppointmentDetail>> {
        let rows = appointment::list_appointment_details(&self.pool, filter).await?;
        Ok(self.details(rows).await?)
    }

    async fn count_by_service(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<ServiceCount>> {
        let rows = appointment::count_by_service(&self.pool, filter).await?;
        Ok(rows.into_iter().map(ServiceCount::from).collect())
    }
}
