use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/admin/dates/:date/open", post(handlers::admin::open_date))
        .route("/api/admin/dates/:date/close", post(handlers::admin::close_date))
        .route(
            "/api/admin/dates/:date/appointments",
            get(handlers::admin::date_appointments),
        )
        .route("/api/admin/capacity", put(handlers::admin::set_capacity))
        .route(
            "/api/admin/appointments",
            post(handlers::admin::create_manual_booking),
        )
        .route(
            "/api/admin/availability/reset",
            post(handlers::admin::reset_availability),
        )
        .route("/api/admin/stats", get(handlers::admin::stats))
}
