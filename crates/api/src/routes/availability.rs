use axum::{routing::get, Router};
use std::sync::Arc;

use crate::{handlers, ApiState};

pub fn routes() -> Router<Arc<ApiState>> {
    Router::new()
        .route(
            "/api/availability/dates",
            get(handlers::availability::open_dates),
        )
        .route(
            "/api/availability/month/:year/:month",
            get(handlers::availability::month_grid),
        )
        .route(
            "/api/availability/:date",
            get(handlers::availability::date_availability),
        )
}
