//! Read-side queries for the admin panel and the public agenda.

use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use uuid::Uuid;

use crate::booking::calendar::{current_week, display_date, reservable_window};
use crate::clock::Clock;
use crate::errors::{BookingError, BookingResult};
use crate::models::{
    appointment::{AppointmentDetail, AppointmentStatus},
    catalog::{ServiceType, day_name},
    closure::ClosedDate,
    report::{
        AppointmentFilter, BookingContext, CalendarEvent, CancelledRow, DayAgenda, EventDetails,
        Receipt, ServiceCount,
    },
};
use crate::store::Stores;

pub fn status_color(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::Pending => "#f59e0b",
        AppointmentStatus::Attended => "#22c55e",
        AppointmentStatus::Cancelled => "#ef4444",
    }
}

/// Calendar entry spanning the full service duration.
pub fn calendar_event(detail: &AppointmentDetail) -> CalendarEvent {
    let start = detail.date.and_time(detail.slot.time());
    let end = start + Duration::minutes(i64::from(detail.service.duration_minutes));

    CalendarEvent {
        id: detail.id,
        title: format!("{} · {}", detail.client_name, detail.service.name),
        start,
        end,
        color: status_color(detail.status).to_string(),
        details: EventDetails {
            status: detail.status.label().to_string(),
            service: detail.service.name.clone(),
            slot: detail.slot,
            weekday: detail.day.clone(),
            rut: detail.client_rut.clone(),
            phone: detail.client_phone.clone(),
        },
    }
}

pub fn receipt(detail: &AppointmentDetail) -> Receipt {
    Receipt {
        appointment_id: detail.id,
        client_name: detail.client_name.clone(),
        rut: detail.client_rut.clone(),
        date: display_date(detail.date),
        slot: detail.slot,
        service: detail.service.name.clone(),
        extras: detail.extras.iter().map(|e| e.name.clone()).collect(),
        total: detail.total(),
    }
}

#[derive(Clone)]
pub struct ReportingService {
    stores: Stores,
    clock: Arc<dyn Clock>,
}

impl ReportingService {
    pub fn new(stores: Stores, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub async fn list_services(&self) -> BookingResult<Vec<ServiceType>> {
        self.stores.catalog.list_services().await
    }

    /// What the booking form needs to render.
    pub async fn booking_context(&self) -> BookingResult<BookingContext> {
        let today = self.clock.today();
        let mut days = self.stores.catalog.list_days().await?;
        days.sort_by_key(|d| d.weekday.num_days_from_monday());

        Ok(BookingContext {
            services: self.stores.catalog.list_services().await?,
            operating_days: days.into_iter().map(|d| d.name).collect(),
            today,
            today_name: day_name(today.weekday()).to_string(),
            today_closed: self.stores.closures.is_closed(today).await?,
            window: reservable_window(today),
        })
    }

    pub async fn list_appointments(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<AppointmentDetail>> {
        self.stores.reservations.list_appointments(filter).await
    }

    pub async fn count_by_service(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<ServiceCount>> {
        self.stores.reservations.count_by_service(filter).await
    }

    pub async fn calendar_events(
        &self,
        filter: &AppointmentFilter,
    ) -> BookingResult<Vec<CalendarEvent>> {
        let details = self.stores.reservations.list_appointments(filter).await?;
        Ok(details.iter().map(calendar_event).collect())
    }

    /// Cancelled appointments in `[start, end)`.
    pub async fn cancelled(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        service_id: Option<Uuid>,
    ) -> BookingResult<Vec<CancelledRow>> {
        let filter = AppointmentFilter {
            start: Some(start),
            end: Some(end),
            service_id,
            status: Some(AppointmentStatus::Cancelled),
            ..Default::default()
        };

        let rows = self.stores.reservations.list_appointments(&filter).await?;
        Ok(rows
            .into_iter()
            .map(|detail| CancelledRow {
                name: detail.client_name,
                rut: detail.client_rut,
                date: display_date(detail.date),
                slot: detail.slot,
                service: detail.service.name,
            })
            .collect())
    }

    /// Non-cancelled appointments on `date` (today by default) plus the current week.
    pub async fn day_agenda(&self, date: Option<NaiveDate>) -> BookingResult<DayAgenda> {
        let today = self.clock.today();
        let date = date.unwrap_or(today);

        let filter = AppointmentFilter {
            date: Some(date),
            ..Default::default()
        };
        let appointments = self
            .stores
            .reservations
            .list_appointments(&filter)
            .await?
            .into_iter()
            .filter(|a| a.status.occupies_slot())
            .collect();

        Ok(DayAgenda {
            date,
            label: format!("{} {}", day_name(date.weekday()), display_date(date)),
            week: current_week(today),
            appointments,
        })
    }

    pub async fn receipt(&self, id: Uuid) -> BookingResult<Receipt> {
        let detail = self
            .stores
            .reservations
            .get_appointment_detail(id)
            .await?
            .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {} not found", id)))?;
        Ok(receipt(&detail))
    }

    pub async fn close_date(
        &self,
        date: NaiveDate,
        reason: Option<String>,
    ) -> BookingResult<ClosedDate> {
        let reason = reason.map(|r| r.trim().to_string()).filter(|r| !r.is_empty());
        let closure = self.stores.closures.close_date(date, reason).await?;
        tracing::info!("Closed {} for bookings", date);
        Ok(closure)
    }

    pub async fn reopen_date(&self, date: NaiveDate) -> BookingResult<()> {
        if self.stores.closures.reopen_date(date).await? {
            tracing::info!("Reopened {} for bookings", date);
            Ok(())
        } else {
            Err(BookingError::NotFound(format!("{} is not closed", date)))
        }
    }

    /// Closures from `from` (today by default) onwards.
    pub async fn list_closures(&self, from: Option<NaiveDate>) -> BookingResult<Vec<ClosedDate>> {
        let from = from.unwrap_or_else(|| self.clock.today());
        self.stores.closures.list_closures(from).await
    }
}
