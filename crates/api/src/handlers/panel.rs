//! Staff panel: status changes, listings, calendar feed, stats, CSV export
//! and date closures.
//!
//! Listing filters are lenient: a malformed `start`, `end`, `day`, `service`
//! or `status` value is ignored. `start` and `end` also accept ISO datetimes,
//! of which only the date part is used. The CSV export requires a valid
//! `start` and `end`.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use barbershop_core::{
    booking::calendar::parse_date,
    errors::BookingError,
    models::{
        appointment::{Appointment, AppointmentDetail, AppointmentStatus, SetStatusRequest},
        catalog::weekday_from_name,
        closure::{CloseDateRequest, ClosedDate},
        report::{AppointmentFilter, CalendarEvent, CancelledRow, StatsResponse},
    },
};
use chrono::NaiveDate;
use eyre::WrapErr;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use super::{RowsResponse, non_empty};
use crate::{ApiState, middleware::error_handling::AppError};

pub const CSV_HEADERS: [&str; 9] = [
    "ID", "Date", "Time", "Client", "RUT", "Phone", "Service", "Day", "Status",
];

#[derive(Debug, Default, Deserialize)]
pub struct PanelQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub date: Option<String>,
    pub day: Option<String>,
    pub service: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
}

/// Date part of a range bound. Calendar widgets send `2024-06-10T00:00:00-04:00`.
fn parse_bound(raw: &str) -> Option<NaiveDate> {
    parse_date(raw.get(..10).unwrap_or(raw)).ok()
}

impl PanelQuery {
    fn start(&self) -> Option<NaiveDate> {
        non_empty(&self.start).and_then(parse_bound)
    }

    fn end(&self) -> Option<NaiveDate> {
        non_empty(&self.end).and_then(parse_bound)
    }

    fn service_id(&self) -> Option<Uuid> {
        non_empty(&self.service).and_then(|id| Uuid::parse_str(id).ok())
    }

    fn filter(&self) -> AppointmentFilter {
        AppointmentFilter {
            start: self.start(),
            end: self.end(),
            date: non_empty(&self.date).and_then(|d| parse_date(d).ok()),
            weekday: non_empty(&self.day).and_then(weekday_from_name),
            service_id: self.service_id(),
            status: non_empty(&self.status).and_then(|s| s.parse::<AppointmentStatus>().ok()),
            search: non_empty(&self.q).map(str::to_string),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ClosuresQuery {
    pub from: Option<String>,
}

#[axum::debug_handler]
pub async fn set_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetStatusRequest>,
) -> Result<Json<Appointment>, AppError> {
    let appointment = state.booking.set_status(id, &payload.status).await?;
    Ok(Json(appointment))
}

pub async fn list_appointments(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Json<Vec<AppointmentDetail>>, AppError> {
    Ok(Json(state.reporting.list_appointments(&query.filter()).await?))
}

/// Calendar feed; `end` is exclusive.
pub async fn calendar_events(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    Ok(Json(state.reporting.calendar_events(&query.filter()).await?))
}

/// Appointments per service in `[start, end)`. Empty without both bounds.
pub async fn stats(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Json<StatsResponse>, AppError> {
    if query.start().is_none() || query.end().is_none() {
        return Ok(Json(StatsResponse::default()));
    }
    let counts = state.reporting.count_by_service(&query.filter()).await?;
    Ok(Json(counts.into()))
}

/// Cancelled appointments in `[start, end)`. Empty without both bounds.
pub async fn cancelled(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Json<RowsResponse<CancelledRow>>, AppError> {
    let (Some(start), Some(end)) = (query.start(), query.end()) else {
        return Ok(Json(Vec::new().into()));
    };
    let rows = state
        .reporting
        .cancelled(start, end, query.service_id())
        .await?;
    Ok(Json(rows.into()))
}

pub fn appointments_csv(rows: &[AppointmentDetail]) -> eyre::Result<Vec<u8>> {
    let mut wtr = csv::WriterBuilder::new().from_writer(Vec::new());
    wtr.write_record(CSV_HEADERS)?;
    for row in rows {
        wtr.write_record([
            row.id.to_string(),
            row.date.to_string(),
            row.slot.to_string(),
            row.client_name.clone(),
            row.client_rut.clone(),
            row.client_phone.clone(),
            row.service.name.clone(),
            row.day.clone(),
            row.status.label().to_string(),
        ])?;
    }
    wtr.into_inner().wrap_err("Failed to flush CSV export")
}

/// CSV download of the appointments in `[start, end)`.
pub async fn export_csv(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<PanelQuery>,
) -> Result<Response, AppError> {
    let missing: Vec<&str> = [("start", &query.start), ("end", &query.end)]
        .into_iter()
        .filter(|(_, value)| non_empty(value).is_none())
        .map(|(name, _)| name)
        .collect();
    if !missing.is_empty() {
        return Err(BookingError::MissingFields(missing.join(", ")).into());
    }

    let start = parse_date(query.start.as_deref().unwrap_or_default())?;
    let end = parse_date(query.end.as_deref().unwrap_or_default())?;
    let filter = AppointmentFilter {
        start: Some(start),
        end: Some(end),
        ..query.filter()
    };

    let rows = state.reporting.list_appointments(&filter).await?;
    let body = appointments_csv(&rows)?;
    tracing::info!("Exported {} appointments from {} to {}", rows.len(), start, end);

    let disposition = format!(
        "attachment; filename=\"appointments_{}_{}.csv\"",
        start.format("%Y%m%d"),
        end.format("%Y%m%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response())
}

/// Closures from `from` onwards (today when omitted).
pub async fn list_closures(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<ClosuresQuery>,
) -> Result<Json<Vec<ClosedDate>>, AppError> {
    let from = non_empty(&query.from).map(parse_date).transpose()?;
    Ok(Json(state.reporting.list_closures(from).await?))
}

pub async fn close_date(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CloseDateRequest>,
) -> Result<(StatusCode, Json<ClosedDate>), AppError> {
    let date = parse_date(&payload.date)?;
    let closure = state.reporting.close_date(date, payload.reason).await?;
    Ok((StatusCode::CREATED, Json(closure)))
}

pub async fn reopen_date(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<String>,
) -> Result<StatusCode, AppError> {
    let date = parse_date(&date)?;
    state.reporting.reopen_date(date).await?;
    Ok(StatusCode::NO_CONTENT)
}
