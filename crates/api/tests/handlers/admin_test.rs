use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use pretty_assertions::assert_eq;

use slotbook_api::handlers::admin::{
    close_date, create_manual_booking, date_appointments, open_date, reset_availability,
    set_capacity, stats, ManualBookingRequest, SetCapacityRequest,
};
use slotbook_api::handlers::bookings::create_booking;
use slotbook_core::errors::BookingError;
use slotbook_core::models::{DateStatus, SlotId};

use crate::test_utils::{booking_payload, far_monday, test_date, TestContext};

fn manual_payload(date: chrono::NaiveDate, slot: SlotId) -> ManualBookingRequest {
    ManualBookingRequest {
        date,
        slot,
        name: "Walk In".to_string(),
        email: "walkin@example.com".to_string(),
        phone: None,
        address: "100 Main St".to_string(),
        service: "interior-detail".to_string(),
        addons: Vec::new(),
        message: Some("taken over the phone".to_string()),
    }
}

#[tokio::test]
async fn test_open_then_close_weekend_date() {
    let ctx = TestContext::new();
    let saturday = test_date(2099, 6, 6);

    let Json(opened) = open_date(State(ctx.state.clone()), Path(saturday)).await;
    assert_eq!(opened.status, DateStatus::Available);

    let Json(closed) = close_date(State(ctx.state.clone()), Path(saturday)).await;
    assert_eq!(closed.status, DateStatus::Unavailable);
}

#[tokio::test]
async fn test_set_capacity_rejects_zero() {
    let ctx = TestContext::new();

    let err = set_capacity(
        State(ctx.state.clone()),
        Json(SetCapacityRequest { capacity: 0 }),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);

    let Json(response) = set_capacity(
        State(ctx.state.clone()),
        Json(SetCapacityRequest { capacity: 3 }),
    )
    .await
    .unwrap();
    assert_eq!(response.capacity, 3);
}

#[tokio::test]
async fn test_manual_booking_requires_open_date() {
    let ctx = TestContext::new();
    let saturday = test_date(2099, 6, 6);

    let err = create_manual_booking(
        State(ctx.state.clone()),
        Json(manual_payload(saturday, SlotId::Morning)),
    )
    .await
    .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);

    open_date(State(ctx.state.clone()), Path(saturday)).await;
    let (status, Json(response)) = create_manual_booking(
        State(ctx.state.clone()),
        Json(manual_payload(saturday, SlotId::Morning)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(ctx.ledger.snapshot()[0].id, response.id);
}

#[tokio::test]
async fn test_manual_booking_on_full_date_is_capacity_exceeded() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());
    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Afternoon)),
    )
    .await
    .unwrap();
    ctx.pump();

    let err = create_manual_booking(
        State(ctx.state.clone()),
        Json(manual_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap_err();

    assert!(matches!(err.0, BookingError::CapacityExceeded(_)));
    assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_stats_reflect_ledger_snapshot() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());
    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    ctx.pump();

    let Json(dashboard) = stats(State(ctx.state.clone())).await;
    assert_eq!(dashboard.total, 1);
    assert_eq!(dashboard.new_count, 1);
    assert_eq!(dashboard.confirmed_count, 0);
    assert_eq!(dashboard.outstanding_revenue, 250); // sedan-full + clay-bar
}

#[tokio::test]
async fn test_date_appointments_lists_active_bookings_only() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());
    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    ctx.pump();

    let Json(listing) = date_appointments(State(ctx.state.clone()), Path(far_monday())).await;
    assert_eq!(listing.appointments.len(), 1);
    assert_eq!(listing.appointments[0].service_name, "Sedan Full Detail");
    assert_eq!(
        listing.appointments[0].service_time.as_deref(),
        Some("9:00-13:00")
    );

    // A date with nothing on it answers with an empty list
    let Json(empty) = date_appointments(State(ctx.state.clone()), Path(test_date(2099, 6, 2))).await;
    assert!(empty.appointments.is_empty());
}

#[tokio::test]
async fn test_reset_availability_restores_weekday_defaults() {
    let ctx = TestContext::new();
    let saturday = test_date(2099, 6, 6);
    open_date(State(ctx.state.clone()), Path(saturday)).await;

    let Json(response) = reset_availability(State(ctx.state.clone())).await;

    assert!((60..=66).contains(&response.open_dates));
    assert!(!ctx.state.store.is_date_open(saturday));
}
