use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::public};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/services", get(public::list_services))
        .route("/api/booking/context", get(public::booking_context))
        .route("/api/window", get(public::reservable_window))
        .route("/api/slots", get(public::available_slots))
        .route("/api/occupied", get(public::occupied_slots))
        .route("/api/appointments", post(public::book_appointment))
        .route("/api/appointments/:id/receipt", get(public::receipt))
        .route("/api/agenda", get(public::day_agenda))
}
