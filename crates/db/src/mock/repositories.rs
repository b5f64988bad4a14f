use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use mockall::mock;
use tokio::sync::watch;
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::ledger::{AppointmentLedger, LedgerSnapshot, LedgerSubscription};
use slotbook_core::models::{Appointment, AppointmentStatus, NewAppointment};

// Mock ledger for expectation-based tests
mock! {
    pub Ledger {}

    #[async_trait]
    impl AppointmentLedger for Ledger {
        async fn create(&self, appointment: NewAppointment) -> BookingResult<Uuid>;
        async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> BookingResult<()>;
        fn subscribe(&self) -> LedgerSubscription;
        fn is_healthy(&self) -> bool;
    }
}

/// In-memory ledger with real snapshot semantics: every write publishes a
/// fresh snapshot on the watch channel, newest first, with server-side
/// timestamps. Used by handler and synchronizer tests in place of Postgres.
pub struct MemoryLedger {
    appointments: Mutex<Vec<Appointment>>,
    snapshot_tx: watch::Sender<LedgerSnapshot>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        let (snapshot_tx, _) = watch::channel(Vec::new());
        Self {
            appointments: Mutex::new(Vec::new()),
            snapshot_tx,
        }
    }

    fn publish(&self, appointments: &[Appointment]) {
        let mut snapshot = appointments.to_vec();
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        self.snapshot_tx.send_replace(snapshot);
    }

    pub fn snapshot(&self) -> LedgerSnapshot {
        let appointments = self.appointments.lock().expect("ledger lock poisoned");
        let mut snapshot = appointments.clone();
        snapshot.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        snapshot
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AppointmentLedger for MemoryLedger {
    async fn create(&self, appointment: NewAppointment) -> BookingResult<Uuid> {
        let id = Uuid::new_v4();
        let now = Utc::now();
        let mut appointments = self.appointments.lock().expect("ledger lock poisoned");
        appointments.push(Appointment {
            id,
            name: appointment.name,
            email: appointment.email,
            phone: appointment.phone,
            address: appointment.address,
            service_date: appointment.service_date,
            service_time: appointment.service_time,
            service: appointment.service,
            addons: appointment.addons,
            message: appointment.message,
            status: AppointmentStatus::New,
            created_at: now,
            updated_at: now,
        });
        self.publish(&appointments);
        Ok(id)
    }

    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> BookingResult<()> {
        let mut appointments = self.appointments.lock().expect("ledger lock poisoned");
        let appointment = appointments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| BookingError::NotFound(format!("Appointment with ID {id} not found")))?;
        appointment.status = status;
        appointment.updated_at = Utc::now();
        self.publish(&appointments);
        Ok(())
    }

    fn subscribe(&self) -> LedgerSubscription {
        LedgerSubscription::new(self.snapshot_tx.subscribe())
    }
}
