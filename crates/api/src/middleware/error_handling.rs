//! # Error Handling Middleware
//!
//! Maps the domain error taxonomy onto HTTP status codes and JSON error
//! responses so every endpoint fails the same way. Booking-acceptance
//! rejections come back as client errors the form can show inline; ledger
//! connectivity problems surface as 502 so the frontend can display its
//! retry-able connection banner.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use slotbook_core::errors::BookingError;

/// Application error wrapper that provides HTTP status code mapping.
///
/// `AppError` wraps domain `BookingError` instances and implements
/// `IntoResponse`, which lets handlers use the `?` operator on any function
/// returning `BookingResult`.
#[derive(Debug)]
pub struct AppError(pub BookingError);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Map error types to HTTP status codes
        let status = match &self.0 {
            BookingError::NotFound(_) => StatusCode::NOT_FOUND,
            BookingError::Validation(_)
            | BookingError::InvalidConfig(_)
            | BookingError::MissingSlot => StatusCode::BAD_REQUEST,
            BookingError::DateUnavailable(_) | BookingError::CapacityExceeded(_) => {
                StatusCode::CONFLICT
            }
            BookingError::Ledger(_) => StatusCode::BAD_GATEWAY,
            BookingError::StoreCorrupt(_) | BookingError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        // Get the error message and format as JSON
        let message = self.0.to_string();
        let body = Json(json!({ "error": message }));

        (status, body).into_response()
    }
}

impl From<BookingError> for AppError {
    fn from(err: BookingError) -> Self {
        AppError(err)
    }
}

impl From<eyre::Report> for AppError {
    fn from(err: eyre::Report) -> Self {
        AppError(BookingError::Ledger(err))
    }
}
