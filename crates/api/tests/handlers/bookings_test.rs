use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use mockall::predicate;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use slotbook_api::handlers::bookings::{
    create_booking, get_booking, list_bookings, update_booking_status, BookingListQuery,
    UpdateBookingStatusRequest,
};
use slotbook_api::ApiState;
use slotbook_core::availability::HorizonPolicy;
use slotbook_core::errors::BookingError;
use slotbook_core::kv::MemoryKvStore;
use slotbook_core::models::{AppointmentStatus, DateStatus, SlotId};
use slotbook_db::mock::repositories::MockLedger;

use crate::test_utils::{booking_payload, far_monday, TestContext};

#[test_log::test(tokio::test)]
async fn test_create_booking_writes_ledger_and_occupies_slot() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());

    let (status, Json(response)) = create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(response.status, AppointmentStatus::New);
    assert_eq!(response.estimated_value, 250); // sedan-full + clay-bar
    assert_eq!(ctx.ledger.snapshot().len(), 1);

    ctx.pump();
    assert_eq!(ctx.state.sync.date_status(far_monday()), DateStatus::Partial);
    assert!(ctx.state.sync.is_slot_booked(far_monday(), SlotId::Morning));
}

#[tokio::test]
async fn test_rebooking_taken_slot_conflicts_but_other_slot_succeeds() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());

    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    ctx.pump();

    // Same slot again: rejected before anything reaches the ledger
    let err = create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap_err();
    assert!(matches!(err.0, BookingError::DateUnavailable(_)));
    assert_eq!(ctx.ledger.snapshot().len(), 1);

    // The afternoon slot is still open
    create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Afternoon)),
    )
    .await
    .unwrap();
    ctx.pump();
    assert_eq!(ctx.state.sync.date_status(far_monday()), DateStatus::Full);
}

#[tokio::test]
async fn test_create_booking_without_slot_is_bad_request() {
    let ctx = TestContext::new();
    ctx.open_date(far_monday());

    let mut payload = booking_payload(far_monday(), SlotId::Morning);
    payload.slot = None;
    let err = create_booking(State(ctx.state.clone()), Json(payload))
        .await
        .unwrap_err();

    assert!(matches!(err.0, BookingError::MissingSlot));
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_booking_validates_fields() {
    let ctx = TestContext::new();
    ctx.open_date(far_monday());

    let mut payload = booking_payload(far_monday(), SlotId::Morning);
    payload.email = "not an email".to_string();
    let err = create_booking(State(ctx.state.clone()), Json(payload))
        .await
        .unwrap_err();

    assert!(matches!(err.0, BookingError::Validation(_)));
    assert!(ctx.ledger.snapshot().is_empty());
}

#[tokio::test]
async fn test_list_bookings_filters_by_status() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());

    let (_, Json(created)) = create_booking(
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
    update_booking_status(
        State(ctx.state.clone()),
        Path(created.id),
        Json(UpdateBookingStatusRequest {
            status: AppointmentStatus::Confirmed,
        }),
    )
    .await
    .unwrap();
    ctx.pump();

    let query = BookingListQuery {
        status: Some("confirmed".to_string()),
        created_within: None,
        search: None,
    };
    let Json(response) = list_bookings(State(ctx.state.clone()), Query(query))
        .await
        .unwrap();

    assert_eq!(response.bookings.len(), 1);
    assert_eq!(response.bookings[0].id, created.id);
    assert_eq!(response.bookings[0].status, AppointmentStatus::Confirmed);
}

#[tokio::test]
async fn test_list_bookings_rejects_unknown_status() {
    let ctx = TestContext::new();
    let query = BookingListQuery {
        status: Some("archived".to_string()),
        created_within: None,
        search: None,
    };
    let err = list_bookings(State(ctx.state.clone()), Query(query))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_booking_returns_estimated_value() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());

    let (_, Json(created)) = create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    ctx.pump();

    let Json(view) = get_booking(State(ctx.state.clone()), Path(created.id))
        .await
        .unwrap();
    assert_eq!(view.service_name, "Sedan Full Detail");
    assert_eq!(view.estimated_value, 250);
    assert_eq!(view.service_time.as_deref(), Some("9:00-13:00"));
}

#[tokio::test]
async fn test_get_unknown_booking_is_not_found() {
    let ctx = TestContext::new();
    let err = get_booking(State(ctx.state.clone()), Path(Uuid::new_v4()))
        .await
        .unwrap_err();
    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_status_for_unknown_booking_maps_not_found() {
    let mut ledger = MockLedger::new();
    let id = Uuid::new_v4();
    ledger
        .expect_set_status()
        .with(predicate::eq(id), predicate::eq(AppointmentStatus::Cancelled))
        .returning(|id, _| Err(BookingError::NotFound(format!("Appointment with ID {id} not found"))));

    let state = Arc::new(ApiState::new(
        Arc::new(ledger),
        Box::new(MemoryKvStore::new()),
        HorizonPolicy::default(),
    ));
    let err = update_booking_status(
        State(state),
        Path(id),
        Json(UpdateBookingStatusRequest {
            status: AppointmentStatus::Cancelled,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_cancelling_frees_the_slot_on_next_pump() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());

    let (_, Json(created)) = create_booking(
        State(ctx.state.clone()),
        Json(booking_payload(far_monday(), SlotId::Morning)),
    )
    .await
    .unwrap();
    ctx.pump();
    assert_eq!(ctx.state.sync.date_status(far_monday()), DateStatus::Partial);

    update_booking_status(
        State(ctx.state.clone()),
        Path(created.id),
        Json(UpdateBookingStatusRequest {
            status: AppointmentStatus::Cancelled,
        }),
    )
    .await
    .unwrap();
    ctx.pump();

    assert_eq!(ctx.state.sync.date_status(far_monday()), DateStatus::Available);
    // The ledger document still exists with its new status
    assert_eq!(ctx.ledger.snapshot().len(), 1);
    assert_eq!(ctx.ledger.snapshot()[0].status, AppointmentStatus::Cancelled);
}
