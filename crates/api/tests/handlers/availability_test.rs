use axum::extract::{Path, Query, State};
use axum::Json;
use pretty_assertions::assert_eq;

use slotbook_api::handlers::availability::{date_availability, month_grid, open_dates, MonthQuery};
use slotbook_core::calendar::DayCellKind;
use slotbook_core::models::{DateStatus, SlotId};

use crate::test_utils::{far_monday, test_date, TestContext};

#[tokio::test]
async fn test_open_dates_are_ascending() {
    let ctx = TestContext::new();
    let Json(response) = open_dates(State(ctx.state.clone())).await;

    assert!(!response.dates.is_empty());
    assert!(response.dates.windows(2).all(|pair| pair[0] < pair[1]));
}

#[tokio::test]
async fn test_date_availability_reports_open_slots() {
    let mut ctx = TestContext::new();
    ctx.open_date(far_monday());
    ctx.pump();

    let Json(response) = date_availability(State(ctx.state.clone()), Path(far_monday())).await;

    assert_eq!(response.status, DateStatus::Available);
    assert!(response.bookable);
    assert_eq!(response.open_slots.len(), 2);
    assert_eq!(response.open_slots[0].id, SlotId::Morning);
    assert_eq!(response.open_slots[0].label, "9:00 AM - 1:00 PM");
    assert_eq!(response.active_appointments, 0);
}

#[tokio::test]
async fn test_date_availability_for_default_weekend_is_unavailable() {
    let ctx = TestContext::new();
    let saturday = test_date(2099, 6, 6);

    let Json(response) = date_availability(State(ctx.state.clone()), Path(saturday)).await;

    assert_eq!(response.status, DateStatus::Unavailable);
    assert!(!response.bookable);
    assert!(response.open_slots.is_empty());
}

#[tokio::test]
async fn test_month_grid_shape_and_admin_interactivity() {
    let ctx = TestContext::new();
    ctx.open_date(far_monday());

    let Json(grid) = month_grid(
        State(ctx.state.clone()),
        Path((2099, 6)),
        Query(MonthQuery { admin: false }),
    )
    .await
    .unwrap();
    assert_eq!(grid.cells.len(), 30);
    assert_eq!(grid.leading_blanks, 1);
    let saturday_cell = &grid.cells[5];
    assert_eq!(saturday_cell.kind, DayCellKind::Unavailable);
    assert!(!saturday_cell.interactive);

    // The same weekend is manageable in admin mode
    let Json(admin_grid) = month_grid(
        State(ctx.state.clone()),
        Path((2099, 6)),
        Query(MonthQuery { admin: true }),
    )
    .await
    .unwrap();
    assert!(admin_grid.cells[5].interactive);
}

#[tokio::test]
async fn test_month_grid_rejects_invalid_month() {
    let ctx = TestContext::new();
    let result = month_grid(
        State(ctx.state.clone()),
        Path((2099, 13)),
        Query(MonthQuery { admin: false }),
    )
    .await;
    assert!(result.is_err());
}
