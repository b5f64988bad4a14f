//! # Availability Synchronizer
//!
//! Derives per-date booked/available status from the live appointment
//! ledger and reconciles it into the availability store. [`reconcile`] is a
//! pure function from (current day records, ledger snapshot) to new day
//! records, so the whole derivation is testable without a backend;
//! [`AvailabilitySync`] wraps it with the store handle and the retained
//! snapshot that backs per-date appointment queries.
//!
//! Snapshot application is idempotent: redelivering the same snapshot
//! produces the same store state.

use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

use chrono::{NaiveDate, Utc};
use tracing::debug;

use crate::availability::{AvailabilityStore, HorizonPolicy};
use crate::ledger::LedgerSnapshot;
use crate::models::day::{DateStatus, DayRecord, SlotId};
use crate::models::Appointment;

/// Map free-text service times onto exactly one slot.
///
/// The recognized tokens come from the booking form's historical formats:
/// `9:00`/`9-1` mean the morning window and `1:00`/`1-5` the afternoon one.
/// Unrecognized text falls back deterministically: an `8:00` token reads as
/// morning, anything else as afternoon.
pub fn normalize_service_time(text: &str) -> SlotId {
    if text.contains("9:00") || text.contains("9-1") {
        SlotId::Morning
    } else if text.contains("1:00") || text.contains("1-5") {
        SlotId::Afternoon
    } else if text.contains("8:00") {
        SlotId::Morning
    } else {
        SlotId::Afternoon
    }
}

/// Recompute every date's booked slots from a ledger snapshot.
///
/// Existing records keep their `is_available` flag; their booked slots are
/// replaced wholesale. Dates referenced by the snapshot but absent from the
/// map are created with the weekday-default open flag. Two appointments in
/// the same slot collapse to one occupied slot.
pub fn reconcile(
    days: &BTreeMap<NaiveDate, DayRecord>,
    snapshot: &[Appointment],
    horizon: HorizonPolicy,
) -> BTreeMap<NaiveDate, DayRecord> {
    let mut next = days.clone();
    for record in next.values_mut() {
        record.booked_slots.clear();
    }

    for appointment in snapshot {
        if !appointment.status.is_active() {
            continue;
        }
        let (Some(date), Some(time)) = (appointment.service_date, appointment.service_time.as_deref())
        else {
            continue;
        };
        let slot = normalize_service_time(time);
        let record = next.entry(date).or_insert_with(|| DayRecord {
            is_available: horizon.default_open(date),
            booked_slots: Default::default(),
        });
        record.booked_slots.insert(slot);
    }

    next
}

pub struct AvailabilitySync {
    store: Arc<AvailabilityStore>,
    appointments: RwLock<Vec<Appointment>>,
}

impl AvailabilitySync {
    pub fn new(store: Arc<AvailabilityStore>) -> Self {
        Self {
            store,
            appointments: RwLock::new(Vec::new()),
        }
    }

    pub fn store(&self) -> &Arc<AvailabilityStore> {
        &self.store
    }

    /// Apply one ledger snapshot: reconcile booked slots, swap the result
    /// into the store (one persist, one change notification for the whole
    /// pass), and retain the snapshot for appointment queries.
    pub fn apply_snapshot(&self, snapshot: LedgerSnapshot) {
        let days = reconcile(&self.store.all_days(), &snapshot, self.store.horizon());
        debug!(appointments = snapshot.len(), dates = days.len(), "applying ledger snapshot");
        *self.appointments.write().expect("sync lock poisoned") = snapshot;
        self.store.apply_day_records(days);
    }

    /// Booking status for one date. A closed date is always unavailable, no
    /// matter what its booked slots say.
    pub fn date_status(&self, date: NaiveDate) -> DateStatus {
        let record = self.store.day_record(date);
        if !record.is_available {
            return DateStatus::Unavailable;
        }
        let occupied = record.occupied();
        if occupied == 0 {
            DateStatus::Available
        } else if occupied < self.store.capacity() {
            DateStatus::Partial
        } else {
            DateStatus::Full
        }
    }

    /// True when the date still has capacity and is not in the past.
    pub fn is_date_bookable(&self, date: NaiveDate) -> bool {
        self.is_date_bookable_on(date, Utc::now().date_naive())
    }

    pub fn is_date_bookable_on(&self, date: NaiveDate, today: NaiveDate) -> bool {
        date >= today && self.date_status(date).is_bookable()
    }

    /// Whether a specific slot on a date is already taken.
    pub fn is_slot_booked(&self, date: NaiveDate, slot: SlotId) -> bool {
        self.store.day_record(date).booked_slots.contains(&slot)
    }

    /// Slots still open on a date; zero when the date is closed.
    pub fn open_slots(&self, date: NaiveDate) -> Vec<SlotId> {
        let record = self.store.day_record(date);
        if !record.is_available {
            return Vec::new();
        }
        SlotId::ALL
            .into_iter()
            .filter(|slot| !record.booked_slots.contains(slot))
            .collect()
    }

    /// Active appointments for one date, ordered by creation time.
    pub fn appointments_for(&self, date: NaiveDate) -> Vec<Appointment> {
        let appointments = self.appointments.read().expect("sync lock poisoned");
        let mut matching: Vec<Appointment> = appointments
            .iter()
            .filter(|a| a.status.is_active() && a.service_date == Some(date))
            .cloned()
            .collect();
        matching.sort_by_key(|a| a.created_at);
        matching
    }

    /// How many active appointments reference a date. Unlike slot occupancy
    /// this does not collapse duplicates; the admin dashboard shows it.
    pub fn active_count_for(&self, date: NaiveDate) -> usize {
        self.appointments
            .read()
            .expect("sync lock poisoned")
            .iter()
            .filter(|a| a.status.is_active() && a.service_date == Some(date))
            .count()
    }

    /// The retained ledger snapshot, newest first.
    pub fn all_appointments(&self) -> Vec<Appointment> {
        self.appointments.read().expect("sync lock poisoned").clone()
    }

    pub fn appointment(&self, id: uuid::Uuid) -> Option<Appointment> {
        self.appointments
            .read()
            .expect("sync lock poisoned")
            .iter()
            .find(|a| a.id == id)
            .cloned()
    }
}
