use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use barbershop_core::{
    booking::calendar::parse_date,
    errors::BookingError,
    models::{
        appointment::{Appointment, BookingRequest},
        catalog::{ServiceType, SlotLabel},
        report::{BookingContext, DayAgenda, OccupiedSlot, Receipt, ReservableWindow},
    },
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use super::{RowsResponse, non_empty};
use crate::{ApiState, middleware::error_handling::AppError};

#[derive(Debug, Default, Deserialize)]
pub struct SlotsQuery {
    pub date: Option<String>,
    pub service: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DateQuery {
    pub date: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SlotsResponse {
    pub slots: Vec<SlotLabel>,
}

pub async fn list_services(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<Vec<ServiceType>>, AppError> {
    Ok(Json(state.reporting.list_services().await?))
}

pub async fn booking_context(
    State(state): State<Arc<ApiState>>,
) -> Result<Json<BookingContext>, AppError> {
    Ok(Json(state.reporting.booking_context().await?))
}

pub async fn reservable_window(State(state): State<Arc<ApiState>>) -> Json<ReservableWindow> {
    Json(state.booking.reservable_window())
}

/// Bookable start slots. Missing or malformed parameters yield an empty list.
pub async fn available_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<SlotsQuery>,
) -> Result<Json<SlotsResponse>, AppError> {
    let (Some(date), Some(service)) = (non_empty(&query.date), non_empty(&query.service)) else {
        return Ok(Json(SlotsResponse { slots: Vec::new() }));
    };

    let slots = match state.booking.available_slots_for_query(date, service).await {
        Ok(slots) => slots,
        Err(BookingError::InvalidDate(_) | BookingError::NotFound(_)) => Vec::new(),
        Err(e) => return Err(e.into()),
    };
    Ok(Json(SlotsResponse { slots }))
}

/// Slots already held on a date. Missing or malformed dates yield no rows.
pub async fn occupied_slots(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<RowsResponse<OccupiedSlot>>, AppError> {
    let Some(date) = non_empty(&query.date).and_then(|d| parse_date(d).ok()) else {
        return Ok(Json(Vec::new().into()));
    };
    Ok(Json(state.booking.occupied_slots(date).await?.into()))
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<BookingRequest>,
) -> Result<(StatusCode, Json<Appointment>), AppError> {
    let appointment = state.booking.book_appointment(payload).await?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

pub async fn receipt(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Receipt>, AppError> {
    Ok(Json(state.reporting.receipt(id).await?))
}

/// Active appointments on `date` (today when omitted) and the current week.
pub async fn day_agenda(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<DateQuery>,
) -> Result<Json<DayAgenda>, AppError> {
    let date = non_empty(&query.date).map(parse_date).transpose()?;
    Ok(Json(state.reporting.day_agenda(date).await?))
}
