//! # Appointment Ledger
//!
//! The authoritative remote store of booking requests, consumed through a
//! narrow trait: create, status update, and a whole-snapshot subscription.
//!
//! Snapshots are delivered over a `tokio::sync::watch` channel: delivery is
//! ordered, the latest snapshot always wins, and a superseded snapshot can
//! never overwrite a later one. The same snapshot may be observed more than
//! once, so consumers must be idempotent. Dropping a [`LedgerSubscription`]
//! unsubscribes; dropping one that never received anything is safe.

use async_trait::async_trait;
use tokio::sync::watch;
use uuid::Uuid;

use crate::errors::BookingResult;
use crate::models::{Appointment, AppointmentStatus, NewAppointment};

/// One whole-ledger snapshot, newest appointments first.
pub type LedgerSnapshot = Vec<Appointment>;

#[async_trait]
pub trait AppointmentLedger: Send + Sync {
    /// Create an appointment with status `new`. Identity and both
    /// timestamps are assigned server-side, not from the client clock.
    async fn create(&self, appointment: NewAppointment) -> BookingResult<Uuid>;

    /// Transition an appointment's status, bumping its server-side
    /// `updated_at`. Appointments are never deleted.
    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> BookingResult<()>;

    /// Subscribe to snapshot updates. Every subscriber observes the current
    /// snapshot immediately and each subsequent change in order.
    fn subscribe(&self) -> LedgerSubscription;

    /// Whether the backing store is currently reachable. A degraded ledger
    /// keeps serving last-known-good snapshots.
    fn is_healthy(&self) -> bool {
        true
    }
}

/// Receiving half of the snapshot channel handed out by
/// [`AppointmentLedger::subscribe`].
pub struct LedgerSubscription {
    rx: watch::Receiver<LedgerSnapshot>,
}

impl LedgerSubscription {
    pub fn new(rx: watch::Receiver<LedgerSnapshot>) -> Self {
        Self { rx }
    }

    /// Wait for the next snapshot. Returns `None` once the ledger side has
    /// shut down and no further snapshots will arrive.
    pub async fn next(&mut self) -> Option<LedgerSnapshot> {
        match self.rx.changed().await {
            Ok(()) => Some(self.rx.borrow_and_update().clone()),
            Err(_) => None,
        }
    }

    /// The most recent snapshot, without waiting.
    pub fn latest(&mut self) -> LedgerSnapshot {
        self.rx.borrow_and_update().clone()
    }
}
