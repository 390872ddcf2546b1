//! # Error Handling Middleware
//!
//! Maps booking errors to HTTP status codes and JSON error bodies of the form
//! `{"error": "<message>"}`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use barbershop_core::errors::BookingError;
use serde_json::json;

/// Application error wrapper that provides HTTP status code mapping
///
/// # Example
///
/// ```
/// use axum::Json;
/// use barbershop_api::middleware::error_handling::AppError;
/// use barbershop_core::errors::BookingError;
///
/// async fn handler(slot: Option<String>) -> Result<Json<String>, AppError> {
///     let slot = slot.ok_or_else(|| BookingError::MissingFields("slot".to_string()))?;
///     Ok(Json(slot))
/// }
/// # fn main() {}
/// ```
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl AppError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::SlotUnavailable(_)
            | BookingError::SlotTaken(_)
            | BookingError::SlotConflict(_) => StatusCode::CONFLICT,
            BookingError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {:?}", self.0);
        }

        let body = Json(json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

/// Allows `?` on `BookingResult` in handlers
impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

/// Storage and I/O failures surface as `500`
impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Storage(err))
    }
}
