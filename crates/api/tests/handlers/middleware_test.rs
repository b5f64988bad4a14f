use axum::http::StatusCode;
use axum::response::IntoResponse;
use rstest::rstest;

use slotbook_api::middleware::error_handling::AppError;
use slotbook_core::errors::BookingError;

#[rstest]
#[case(BookingError::NotFound("booking".into()), StatusCode::NOT_FOUND)]
#[case(BookingError::Validation("bad field".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::InvalidConfig("capacity".into()), StatusCode::BAD_REQUEST)]
#[case(BookingError::MissingSlot, StatusCode::BAD_REQUEST)]
#[case(BookingError::DateUnavailable("closed".into()), StatusCode::CONFLICT)]
#[case(BookingError::CapacityExceeded("full".into()), StatusCode::CONFLICT)]
#[case(BookingError::StoreCorrupt("bad json".into()), StatusCode::INTERNAL_SERVER_ERROR)]
#[case(BookingError::Ledger(eyre::eyre!("down")), StatusCode::BAD_GATEWAY)]
fn test_error_status_mapping(#[case] error: BookingError, #[case] expected: StatusCode) {
    let response = AppError(error).into_response();
    assert_eq!(response.status(), expected);
}

#[test]
fn test_eyre_reports_map_to_ledger_errors() {
    let err: AppError = eyre::eyre!("connection refused").into();
    assert!(matches!(err.0, BookingError::Ledger(_)));
}
