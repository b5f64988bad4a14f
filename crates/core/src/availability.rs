//! # Availability Store
//!
//! Single source of truth for which calendar dates are open for service and
//! which half-day slots are taken on each of them. The store owns a map of
//! [`DayRecord`]s plus the per-day capacity, persists both through a
//! [`KvStore`], and notifies subscribed listeners synchronously after every
//! mutation.
//!
//! Booked slots held here are a cache derived from the appointment ledger;
//! the synchronizer overwrites them wholesale on every ledger snapshot, so
//! the ledger always wins over anything persisted locally.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::{BookingError, BookingResult};
use crate::kv::KvStore;
use crate::models::day::{is_weekday, DayRecord, SlotId};

const DAY_RECORDS_KEY: &str = "day_records";
const CAPACITY_KEY: &str = "booking_capacity";

/// Two half-day slots per date.
pub const DEFAULT_CAPACITY: u32 = 2;

/// Rolling-horizon policy used when no stored state exists: the next
/// `days_ahead` weekdays are generated open, weekends closed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HorizonPolicy {
    pub days_ahead: u32,
}

impl HorizonPolicy {
    /// Whether a date outside any explicit configuration defaults to open.
    pub fn default_open(&self, date: NaiveDate) -> bool {
        is_weekday(date)
    }

    /// Generate the default day-record map starting the day after `today`.
    pub fn generate(&self, today: NaiveDate) -> BTreeMap<NaiveDate, DayRecord> {
        let mut days = BTreeMap::new();
        for offset in 1..=self.days_ahead {
            let date = today + Duration::days(i64::from(offset));
            if is_weekday(date) {
                days.insert(date, DayRecord::open());
            }
        }
        days
    }
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        Self { days_ahead: 90 }
    }
}

type Listener = Box<dyn Fn() -> eyre::Result<()> + Send + Sync>;
type ListenerSlot = (u64, Listener);

/// Removes the associated listener when dropped.
pub struct ListenerGuard {
    id: u64,
    listeners: Weak<Mutex<Vec<ListenerSlot>>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(listeners) = self.listeners.upgrade() {
            let mut listeners = listeners.lock().expect("listener lock poisoned");
            listeners.retain(|(id, _)| *id != self.id);
        }
    }
}

struct StoreState {
    days: BTreeMap<NaiveDate, DayRecord>,
    capacity: u32,
}

pub struct AvailabilityStore {
    kv: Box<dyn KvStore>,
    horizon: HorizonPolicy,
    state: RwLock<StoreState>,
    listeners: Arc<Mutex<Vec<ListenerSlot>>>,
    next_listener_id: AtomicU64,
}

impl AvailabilityStore {
    /// Load persisted state, or populate the default weekday horizon when
    /// nothing is stored or the stored JSON is corrupt. Corruption is
    /// recovered locally and never surfaced to callers.
    pub fn new(kv: Box<dyn KvStore>, horizon: HorizonPolicy) -> Self {
        let today = Utc::now().date_naive();
        let days = match kv.get(DAY_RECORDS_KEY) {
            Some(raw) => match serde_json::from_str::<BTreeMap<NaiveDate, DayRecord>>(&raw) {
                Ok(days) => days,
                Err(err) => {
                    let err = BookingError::StoreCorrupt(err.to_string());
                    warn!(%err, "regenerating default availability");
                    horizon.generate(today)
                }
            },
            None => {
                debug!(days_ahead = horizon.days_ahead, "no stored day records, generating defaults");
                horizon.generate(today)
            }
        };
        let capacity = match kv.get(CAPACITY_KEY) {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                warn!(%raw, "stored capacity unparsable, using default");
                DEFAULT_CAPACITY
            }),
            None => DEFAULT_CAPACITY,
        };

        let store = Self {
            kv,
            horizon,
            state: RwLock::new(StoreState { days, capacity }),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener_id: AtomicU64::new(0),
        };
        store.persist();
        store
    }

    pub fn horizon(&self) -> HorizonPolicy {
        self.horizon
    }

    /// All dates currently marked open, ascending.
    pub fn available_dates(&self) -> Vec<NaiveDate> {
        let state = self.state.read().expect("store lock poisoned");
        state
            .days
            .iter()
            .filter(|(_, record)| record.is_available)
            .map(|(date, _)| *date)
            .collect()
    }

    /// Replace the open-date set. Dates not listed are closed; listed dates
    /// keep their booked slots if already known.
    pub fn set_available_dates(&self, dates: &[NaiveDate]) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            for record in state.days.values_mut() {
                record.is_available = false;
            }
            for date in dates {
                state.days.entry(*date).or_insert_with(DayRecord::closed).is_available = true;
            }
        }
        self.persist();
        self.notify_listeners();
    }

    /// Idempotent: opening an already-open date is a no-op apart from the
    /// change notification.
    pub fn add_available_date(&self, date: NaiveDate) {
        self.set_day_availability(date, true);
    }

    pub fn remove_available_date(&self, date: NaiveDate) {
        self.set_day_availability(date, false);
    }

    /// Open-set membership, independent of bookings.
    pub fn is_date_open(&self, date: NaiveDate) -> bool {
        let state = self.state.read().expect("store lock poisoned");
        state.days.get(&date).map(|r| r.is_available).unwrap_or(false)
    }

    /// Record for one date; unknown dates read as closed with no bookings.
    pub fn day_record(&self, date: NaiveDate) -> DayRecord {
        let state = self.state.read().expect("store lock poisoned");
        state.days.get(&date).cloned().unwrap_or_default()
    }

    pub fn capacity(&self) -> u32 {
        self.state.read().expect("store lock poisoned").capacity
    }

    pub fn set_capacity(&self, capacity: u32) -> BookingResult<()> {
        if capacity == 0 {
            return Err(BookingError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        self.state.write().expect("store lock poisoned").capacity = capacity;
        self.persist();
        self.notify_listeners();
        Ok(())
    }

    pub fn set_day_availability(&self, date: NaiveDate, is_available: bool) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            state
                .days
                .entry(date)
                .or_insert_with(DayRecord::closed)
                .is_available = is_available;
        }
        self.persist();
        self.notify_listeners();
    }

    /// Mark one slot taken. Duplicate bookings of the same slot collapse.
    pub fn book_slot(&self, date: NaiveDate, slot: SlotId) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            let default_open = self.horizon.default_open(date);
            let record = state.days.entry(date).or_insert_with(|| DayRecord {
                is_available: default_open,
                booked_slots: Default::default(),
            });
            record.booked_slots.insert(slot);
        }
        self.persist();
        self.notify_listeners();
    }

    pub fn release_slot(&self, date: NaiveDate, slot: SlotId) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            if let Some(record) = state.days.get_mut(&date) {
                record.booked_slots.remove(&slot);
            }
        }
        self.persist();
        self.notify_listeners();
    }

    /// Swap in a fully recomputed day-record map. Used by the synchronizer
    /// so that a whole reconciliation pass persists once and notifies once.
    pub fn apply_day_records(&self, days: BTreeMap<NaiveDate, DayRecord>) {
        {
            let mut state = self.state.write().expect("store lock poisoned");
            state.days = days;
        }
        self.persist();
        self.notify_listeners();
    }

    /// Snapshot of the full day-record map.
    pub fn all_days(&self) -> BTreeMap<NaiveDate, DayRecord> {
        self.state.read().expect("store lock poisoned").days.clone()
    }

    /// Discard every override and regenerate the default weekday horizon.
    /// Booked slots are restored by the next synchronization pass.
    pub fn reset_to_defaults(&self) -> usize {
        let days = self.horizon.generate(Utc::now().date_naive());
        let count = days.len();
        self.apply_day_records(days);
        count
    }

    /// Register a change listener. The listener runs synchronously after
    /// every mutation, once per batch; an error return is logged and does
    /// not affect other listeners or the mutating caller. Dropping the
    /// returned guard unsubscribes.
    pub fn subscribe<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn() -> eyre::Result<()> + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.listeners
            .lock()
            .expect("listener lock poisoned")
            .push((id, Box::new(listener)));
        ListenerGuard {
            id,
            listeners: Arc::downgrade(&self.listeners),
        }
    }

    fn notify_listeners(&self) {
        let listeners = self.listeners.lock().expect("listener lock poisoned");
        for (id, listener) in listeners.iter() {
            if let Err(err) = listener() {
                warn!(listener = *id, %err, "availability change listener failed");
            }
        }
    }

    fn persist(&self) {
        let state = self.state.read().expect("store lock poisoned");
        match serde_json::to_string(&state.days) {
            Ok(raw) => {
                if let Err(err) = self.kv.set(DAY_RECORDS_KEY, &raw) {
                    warn!(%err, "failed to persist day records");
                }
            }
            Err(err) => warn!(%err, "failed to serialize day records"),
        }
        if let Err(err) = self.kv.set(CAPACITY_KEY, &state.capacity.to_string()) {
            warn!(%err, "failed to persist capacity");
        }
    }
}
