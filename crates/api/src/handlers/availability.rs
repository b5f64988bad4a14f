//! # Availability Handlers
//!
//! Queries the calendar widgets render from: the open-date list, per-date
//! booking status, and whole month grids. All answers are derived from the
//! availability store as last reconciled against the appointment ledger,
//! so they reflect the latest snapshot the synchronizer has applied.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use slotbook_core::calendar::{self, CalendarConfig, MonthGrid};
use slotbook_core::models::day::{DateStatus, SlotId};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Serialize)]
pub struct OpenDatesResponse {
    pub dates: Vec<NaiveDate>,
}

/// `GET /api/availability/dates`: all dates marked open, ascending,
/// independent of how booked they are.
#[axum::debug_handler]
pub async fn open_dates(State(state): State<Arc<ApiState>>) -> Json<OpenDatesResponse> {
    Json(OpenDatesResponse {
        dates: state.store.available_dates(),
    })
}

#[derive(Debug, Serialize)]
pub struct SlotView {
    pub id: SlotId,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DateAvailabilityResponse {
    pub date: NaiveDate,
    pub status: DateStatus,
    pub bookable: bool,
    pub open_slots: Vec<SlotView>,
    pub active_appointments: usize,
}

/// `GET /api/availability/:date`: status and open slots for one date.
#[axum::debug_handler]
pub async fn date_availability(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Json<DateAvailabilityResponse> {
    let open_slots = state
        .sync
        .open_slots(date)
        .into_iter()
        .map(|slot| SlotView {
            id: slot,
            label: slot.label(),
        })
        .collect();
    Json(DateAvailabilityResponse {
        date,
        status: state.sync.date_status(date),
        bookable: state.sync.is_date_bookable(date),
        open_slots,
        active_appointments: state.sync.active_count_for(date),
    })
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    /// Render with admin interaction semantics (every non-past date
    /// clickable) instead of customer selection semantics.
    #[serde(default)]
    pub admin: bool,
}

/// `GET /api/availability/month/:year/:month`: one month of calendar
/// cells, classified past > unavailable > full > partial > available.
#[axum::debug_handler]
pub async fn month_grid(
    State(state): State<Arc<ApiState>>,
    Path((year, month)): Path<(i32, u32)>,
    Query(query): Query<MonthQuery>,
) -> Result<Json<MonthGrid>, AppError> {
    let today = Utc::now().date_naive();
    let config = if query.admin {
        CalendarConfig::admin(today)
    } else {
        CalendarConfig::customer(today)
    };
    let grid = calendar::render_month(&state.sync, &config, &BTreeSet::new(), year, month)?;
    Ok(Json(grid))
}
