use axum::{
    Router,
    routing::{delete, get, post},
};
use std::sync::Arc;

use crate::{ApiState, handlers::panel};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/panel/appointments", get(panel::list_appointments))
        .route("/panel/appointments/:id/status", post(panel::set_status))
        .route("/panel/events", get(panel::calendar_events))
        .route("/panel/stats", get(panel::stats))
        .route("/panel/cancelled", get(panel::cancelled))
        .route("/panel/export.csv", get(panel::export_csv))
        .route(
            "/panel/closures",
            get(panel::list_closures).post(panel::close_date),
        )
        .route("/panel/closures/:date", delete(panel::reopen_date))
}
