use axum::{
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route("/api/bookings", post(handlers::bookings::create_booking))
        .route("/api/bookings", get(handlers::bookings::list_bookings))
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/status",
            put(handlers::bookings::update_booking_status),
        )
}
