//! Admin dashboard handlers: manual availability overrides, capacity
//! configuration, manual bookings, and headline statistics.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::admin::{DashboardStats, ManualBooking};
use slotbook_core::models::day::{DateStatus, SlotId};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Serialize)]
pub struct DateOverrideResponse {
    pub date: NaiveDate,
    pub status: DateStatus,
}

/// `POST /api/admin/dates/:date/open`: force a date open, weekends
/// included. Required before manual bookings on a closed date.
#[axum::debug_handler]
pub async fn open_date(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Json<DateOverrideResponse> {
    state.admin.force_date_open(date);
    Json(DateOverrideResponse {
        date,
        status: state.sync.date_status(date),
    })
}

/// `POST /api/admin/dates/:date/close`: block new bookings on a date.
/// Existing appointments stay untouched.
#[axum::debug_handler]
pub async fn close_date(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Json<DateOverrideResponse> {
    state.admin.force_date_closed(date);
    Json(DateOverrideResponse {
        date,
        status: state.sync.date_status(date),
    })
}

#[derive(Debug, Deserialize)]
pub struct SetCapacityRequest {
    pub capacity: u32,
}

#[derive(Debug, Serialize)]
pub struct SetCapacityResponse {
    pub capacity: u32,
}

/// `PUT /api/admin/capacity`
#[axum::debug_handler]
pub async fn set_capacity(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<SetCapacityRequest>,
) -> Result<Json<SetCapacityResponse>, AppError> {
    state.admin.set_capacity(payload.capacity)?;
    Ok(Json(SetCapacityResponse {
        capacity: state.store.capacity(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct ManualBookingRequest {
    pub date: NaiveDate,
    pub slot: SlotId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ManualBookingResponse {
    pub id: Uuid,
}

/// `POST /api/admin/appointments`: book on a customer's behalf. Fails
/// with 409 when the date is closed or already at capacity.
#[axum::debug_handler]
pub async fn create_manual_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<ManualBookingRequest>,
) -> Result<(StatusCode, Json<ManualBookingResponse>), AppError> {
    let id = state
        .admin
        .add_manual_booking(
            payload.date,
            payload.slot,
            ManualBooking {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                address: payload.address,
                service: payload.service,
                addons: payload.addons,
                message: payload.message,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(ManualBookingResponse { id })))
}

#[derive(Debug, Serialize)]
pub struct DateAppointmentView {
    pub id: Uuid,
    pub name: String,
    pub service_time: Option<String>,
    pub service_name: String,
    pub estimated_value: u32,
}

#[derive(Debug, Serialize)]
pub struct DateAppointmentsResponse {
    pub date: NaiveDate,
    pub appointments: Vec<DateAppointmentView>,
}

/// `GET /api/admin/dates/:date/appointments`: active appointments on one
/// date, ordered by creation time, for the day-management view.
#[axum::debug_handler]
pub async fn date_appointments(
    State(state): State<Arc<ApiState>>,
    Path(date): Path<NaiveDate>,
) -> Json<DateAppointmentsResponse> {
    let prices = state.admin.prices();
    let appointments = state
        .sync
        .appointments_for(date)
        .into_iter()
        .map(|a| DateAppointmentView {
            id: a.id,
            service_name: prices.service_name(&a.service).to_string(),
            estimated_value: prices.booking_value(&a.service, &a.addons),
            name: a.name,
            service_time: a.service_time,
        })
        .collect();
    Json(DateAppointmentsResponse { date, appointments })
}

#[derive(Debug, Serialize)]
pub struct ResetAvailabilityResponse {
    pub open_dates: usize,
}

/// `POST /api/admin/availability/reset`: regenerate the default weekday
/// horizon, discarding manual overrides.
#[axum::debug_handler]
pub async fn reset_availability(
    State(state): State<Arc<ApiState>>,
) -> Json<ResetAvailabilityResponse> {
    Json(ResetAvailabilityResponse {
        open_dates: state.admin.reset_availability(),
    })
}

/// `GET /api/admin/stats`: dashboard headline numbers.
#[axum::debug_handler]
pub async fn stats(State(state): State<Arc<ApiState>>) -> Json<DashboardStats> {
    Json(state.admin.statistics())
}
