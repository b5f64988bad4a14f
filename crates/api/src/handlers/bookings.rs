//! Booking submission and booking list handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use slotbook_core::admin::{BookingFilter, CreatedWindow};
use slotbook_core::booking::BookingRequest;
use slotbook_core::errors::BookingError;
use slotbook_core::models::day::SlotId;
use slotbook_core::models::{Appointment, AppointmentStatus};

use crate::{middleware::error_handling::AppError, ApiState};

#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service_date: Option<NaiveDate>,
    pub slot: Option<SlotId>,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreateBookingResponse {
    pub id: Uuid,
    pub status: AppointmentStatus,
    pub estimated_value: u32,
}

/// `POST /api/bookings`: run the acceptance gate, then write the
/// appointment to the ledger with status `new`.
#[axum::debug_handler]
pub async fn create_booking(
    State(state): State<Arc<ApiState>>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<(StatusCode, Json<CreateBookingResponse>), AppError> {
    let estimated_value = state
        .admin
        .prices()
        .booking_value(&payload.service, &payload.addons);

    let id = state
        .desk
        .submit(BookingRequest {
            name: payload.name,
            email: payload.email,
            phone: payload.phone,
            address: payload.address,
            date: payload.service_date,
            slot: payload.slot,
            service: payload.service,
            addons: payload.addons,
            message: payload.message,
        })
        .await?;

    let response = CreateBookingResponse {
        id,
        status: AppointmentStatus::New,
        estimated_value,
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[derive(Debug, Deserialize)]
pub struct BookingListQuery {
    pub status: Option<String>,
    pub created_within: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookingView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service: String,
    pub service_name: String,
    pub addons: Vec<String>,
    pub service_date: Option<NaiveDate>,
    pub service_time: Option<String>,
    pub message: Option<String>,
    pub status: AppointmentStatus,
    pub estimated_value: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct BookingListResponse {
    pub bookings: Vec<BookingView>,
}

fn booking_view(state: &ApiState, appointment: Appointment) -> BookingView {
    let prices = state.admin.prices();
    BookingView {
        service_name: prices.service_name(&appointment.service).to_string(),
        estimated_value: prices.booking_value(&appointment.service, &appointment.addons),
        id: appointment.id,
        name: appointment.name,
        email: appointment.email,
        phone: appointment.phone,
        address: appointment.address,
        service: appointment.service,
        addons: appointment.addons,
        service_date: appointment.service_date,
        service_time: appointment.service_time,
        message: appointment.message,
        status: appointment.status,
        created_at: appointment.created_at,
        updated_at: appointment.updated_at,
    }
}

fn parse_filter(query: &BookingListQuery) -> Result<BookingFilter, AppError> {
    let status = match query.status.as_deref() {
        None | Some("all") => None,
        Some(raw) => Some(
            raw.parse::<AppointmentStatus>()
                .map_err(BookingError::Validation)?,
        ),
    };
    let created_within = match query.created_within.as_deref() {
        None | Some("all") => None,
        Some("today") => Some(CreatedWindow::Today),
        Some("week") => Some(CreatedWindow::Week),
        Some("month") => Some(CreatedWindow::Month),
        Some(other) => {
            return Err(AppError(BookingError::Validation(format!(
                "unknown created_within window: {other}"
            ))));
        }
    };
    Ok(BookingFilter {
        status,
        created_within,
        search: query.search.clone().filter(|s| !s.trim().is_empty()),
    })
}

/// `GET /api/bookings`: filtered booking list, newest first. Served from
/// the synchronizer's retained snapshot so it keeps working on
/// last-known-good data when the ledger connection degrades.
#[axum::debug_handler]
pub async fn list_bookings(
    State(state): State<Arc<ApiState>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingListResponse>, AppError> {
    let filter = parse_filter(&query)?;
    let bookings = state
        .admin
        .filter_bookings(&filter)
        .into_iter()
        .map(|appointment| booking_view(&state, appointment))
        .collect();
    Ok(Json(BookingListResponse { bookings }))
}

/// `GET /api/bookings/:id`
#[axum::debug_handler]
pub async fn get_booking(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingView>, AppError> {
    let appointment = state
        .sync
        .appointment(id)
        .ok_or_else(|| BookingError::NotFound(format!("Booking with ID {id} not found")))?;
    Ok(Json(booking_view(&state, appointment)))
}

#[derive(Debug, Deserialize)]
pub struct UpdateBookingStatusRequest {
    pub status: AppointmentStatus,
}

#[derive(Debug, Serialize)]
pub struct UpdateBookingStatusResponse {
    pub id: Uuid,
    pub status: AppointmentStatus,
}

/// `PUT /api/bookings/:id/status`: admin status transition. Cancelling or
/// completing frees the slot on the next synchronization pass.
#[axum::debug_handler]
pub async fn update_booking_status(
    State(state): State<Arc<ApiState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> Result<Json<UpdateBookingStatusResponse>, AppError> {
    state.admin.set_status(id, payload.status).await?;
    Ok(Json(UpdateBookingStatusResponse {
        id,
        status: payload.status,
    }))
}
