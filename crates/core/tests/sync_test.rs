use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{NaiveDate, TimeZone, Utc};
use pretty_assertions::assert_eq;
use rstest::rstest;
use uuid::Uuid;

use slotbook_core::availability::{AvailabilityStore, HorizonPolicy};
use slotbook_core::kv::MemoryKvStore;
use slotbook_core::models::{Appointment, AppointmentStatus, DateStatus, SlotId};
use slotbook_core::sync::{normalize_service_time, reconcile, AvailabilitySync};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn appointment(
    name: &str,
    service_date: Option<NaiveDate>,
    service_time: Option<&str>,
    status: AppointmentStatus,
) -> Appointment {
    let created_at = Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0).unwrap();
    Appointment {
        id: Uuid::new_v4(),
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: None,
        address: "100 Main St".to_string(),
        service_date,
        service_time: service_time.map(str::to_string),
        service: "sedan-full".to_string(),
        addons: Vec::new(),
        message: None,
        status,
        created_at,
        updated_at: created_at,
    }
}

fn sync_over_fresh_store() -> AvailabilitySync {
    let store = Arc::new(AvailabilityStore::new(
        Box::new(MemoryKvStore::new()),
        HorizonPolicy::default(),
    ));
    AvailabilitySync::new(store)
}

// Monday within the generated horizon for any test run before 2099; tests
// pin dates far enough out that "past" never interferes.
const YEAR: i32 = 2099;

fn monday() -> NaiveDate {
    date(YEAR, 6, 1) // 2099-06-01 is a Monday
}

fn saturday() -> NaiveDate {
    date(YEAR, 6, 6)
}

#[rstest]
#[case("9:00 AM - 1:00 PM", SlotId::Morning)]
#[case("9:00-13:00", SlotId::Morning)]
#[case("9-1", SlotId::Morning)]
#[case("1:00 PM - 5:00 PM", SlotId::Afternoon)]
#[case("13:00-17:00", SlotId::Afternoon)]
#[case("1-5", SlotId::Afternoon)]
#[case("8:00 sharp", SlotId::Morning)] // legacy early-hour token
#[case("whenever works", SlotId::Afternoon)] // deterministic fallback
fn test_normalize_service_time(#[case] text: &str, #[case] expected: SlotId) {
    assert_eq!(normalize_service_time(text), expected);
}

#[test]
fn test_reconcile_books_active_appointments_only() {
    let sync = sync_over_fresh_store();
    sync.apply_snapshot(vec![
        appointment("Active", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("Done", Some(monday()), Some("13:00-17:00"), AppointmentStatus::Completed),
        appointment("Gone", Some(monday()), Some("13:00-17:00"), AppointmentStatus::Cancelled),
        appointment("NoDate", None, Some("9:00-13:00"), AppointmentStatus::New),
    ]);

    let record = sync.store().day_record(monday());
    assert_eq!(record.booked_slots.len(), 1);
    assert!(record.booked_slots.contains(&SlotId::Morning));
}

#[test]
fn test_reconcile_collapses_duplicate_slots_but_counts_appointments() {
    let sync = sync_over_fresh_store();
    sync.apply_snapshot(vec![
        appointment("One", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("Two", Some(monday()), Some("9:00-13:00"), AppointmentStatus::Confirmed),
    ]);

    // Two customers in the same slot occupy it once...
    assert_eq!(sync.store().day_record(monday()).occupied(), 1);
    assert_eq!(sync.date_status(monday()), DateStatus::Partial);
    // ...but the admin view still sees both appointments
    assert_eq!(sync.active_count_for(monday()), 2);
}

#[test]
fn test_reconcile_creates_missing_dates_with_weekday_default() {
    let sync = sync_over_fresh_store();
    // Both dates are far outside the generated horizon
    sync.apply_snapshot(vec![
        appointment("Weekday", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("Weekend", Some(saturday()), Some("9:00-13:00"), AppointmentStatus::New),
    ]);

    assert!(sync.store().day_record(monday()).is_available);
    assert!(!sync.store().day_record(saturday()).is_available);
    // The weekend stays unavailable even though a slot is recorded on it
    assert_eq!(sync.date_status(saturday()), DateStatus::Unavailable);
}

#[test]
fn test_closed_date_is_unavailable_regardless_of_slots() {
    let sync = sync_over_fresh_store();
    sync.store().set_day_availability(monday(), false);
    sync.apply_snapshot(vec![appointment(
        "Booked",
        Some(monday()),
        Some("9:00-13:00"),
        AppointmentStatus::Confirmed,
    )]);

    assert_eq!(sync.date_status(monday()), DateStatus::Unavailable);
    assert!(!sync.is_date_bookable_on(monday(), date(2025, 8, 1)));
}

#[test]
fn test_scenario_open_date_with_no_appointments_is_available() {
    let sync = sync_over_fresh_store();
    sync.store().set_day_availability(monday(), true);
    sync.apply_snapshot(Vec::new());

    assert_eq!(sync.date_status(monday()), DateStatus::Available);
    assert!(sync.is_date_bookable_on(monday(), date(2025, 8, 1)));
    assert_eq!(sync.open_slots(monday()), vec![SlotId::Morning, SlotId::Afternoon]);
}

#[test]
fn test_scenario_one_booking_leaves_partial_capacity() {
    let sync = sync_over_fresh_store();
    sync.store().set_day_availability(monday(), true);
    sync.apply_snapshot(vec![appointment(
        "Morning",
        Some(monday()),
        Some("9:00-13:00"),
        AppointmentStatus::New,
    )]);

    assert_eq!(sync.date_status(monday()), DateStatus::Partial);
    assert!(sync.is_date_bookable_on(monday(), date(2025, 8, 1)));
    assert!(sync.is_slot_booked(monday(), SlotId::Morning));
    assert_eq!(sync.open_slots(monday()), vec![SlotId::Afternoon]);
}

#[test]
fn test_scenario_both_slots_taken_is_full() {
    let sync = sync_over_fresh_store();
    sync.store().set_day_availability(monday(), true);
    sync.apply_snapshot(vec![
        appointment("Morning", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("Afternoon", Some(monday()), Some("13:00-17:00"), AppointmentStatus::Confirmed),
    ]);

    assert_eq!(sync.date_status(monday()), DateStatus::Full);
    assert!(!sync.is_date_bookable_on(monday(), date(2025, 8, 1)));
    assert!(sync.open_slots(monday()).is_empty());
}

#[test]
fn test_scenario_cancellation_frees_the_slot() {
    let sync = sync_over_fresh_store();
    sync.store().set_day_availability(monday(), true);
    let mut morning = appointment("Morning", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New);
    let afternoon = appointment("Afternoon", Some(monday()), Some("13:00-17:00"), AppointmentStatus::New);
    sync.apply_snapshot(vec![morning.clone(), afternoon.clone()]);
    assert_eq!(sync.date_status(monday()), DateStatus::Full);

    // The ledger document still exists, only its status changed
    morning.status = AppointmentStatus::Cancelled;
    sync.apply_snapshot(vec![morning, afternoon]);

    assert_eq!(sync.date_status(monday()), DateStatus::Partial);
    assert!(!sync.is_slot_booked(monday(), SlotId::Morning));
}

#[test]
fn test_apply_snapshot_is_idempotent() {
    let sync = sync_over_fresh_store();
    let snapshot = vec![appointment(
        "Morning",
        Some(monday()),
        Some("9:00-13:00"),
        AppointmentStatus::New,
    )];

    sync.apply_snapshot(snapshot.clone());
    let first = sync.store().all_days();
    sync.apply_snapshot(snapshot);
    assert_eq!(sync.store().all_days(), first);
}

#[test]
fn test_apply_snapshot_notifies_once() {
    let sync = sync_over_fresh_store();
    let count = Arc::new(AtomicUsize::new(0));
    let seen = Arc::clone(&count);
    let _guard = sync.store().subscribe(move || {
        seen.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    sync.apply_snapshot(vec![
        appointment("A", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("B", Some(date(YEAR, 6, 2)), Some("9:00-13:00"), AppointmentStatus::New),
        appointment("C", Some(date(YEAR, 6, 3)), Some("13:00-17:00"), AppointmentStatus::New),
    ]);

    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[test]
fn test_bookable_rejects_past_dates() {
    let sync = sync_over_fresh_store();
    let yesterday = date(2025, 8, 4);
    sync.store().set_day_availability(yesterday, true);

    assert_eq!(sync.date_status(yesterday), DateStatus::Available);
    assert!(!sync.is_date_bookable_on(yesterday, date(2025, 8, 5)));
    // Same-day booking is still allowed
    assert!(sync.is_date_bookable_on(yesterday, yesterday));
}

#[test]
fn test_appointments_for_orders_by_creation_time() {
    let sync = sync_over_fresh_store();
    let mut early = appointment("Early", Some(monday()), Some("9:00-13:00"), AppointmentStatus::New);
    let mut late = appointment("Late", Some(monday()), Some("13:00-17:00"), AppointmentStatus::New);
    early.created_at = Utc.with_ymd_and_hms(2025, 8, 1, 9, 0, 0).unwrap();
    late.created_at = Utc.with_ymd_and_hms(2025, 8, 1, 15, 0, 0).unwrap();
    let cancelled = appointment("Gone", Some(monday()), Some("9:00-13:00"), AppointmentStatus::Cancelled);

    // Delivered newest-first, as the ledger orders snapshots
    sync.apply_snapshot(vec![late.clone(), cancelled, early.clone()]);

    let for_date = sync.appointments_for(monday());
    assert_eq!(for_date.len(), 2);
    assert_eq!(for_date[0].name, "Early");
    assert_eq!(for_date[1].name, "Late");
}

#[test]
fn test_reconcile_pure_function_leaves_input_untouched() {
    let store_days = HorizonPolicy::default().generate(date(2025, 8, 1));
    let before = store_days.clone();
    let snapshot = vec![appointment(
        "Morning",
        Some(date(2025, 8, 4)),
        Some("9:00-13:00"),
        AppointmentStatus::New,
    )];

    let next = reconcile(&store_days, &snapshot, HorizonPolicy::default());

    assert_eq!(store_days, before);
    assert!(next
        .get(&date(2025, 8, 4))
        .is_some_and(|r| r.booked_slots.contains(&SlotId::Morning)));
}
