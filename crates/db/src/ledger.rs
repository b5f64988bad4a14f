//! Postgres-backed appointment ledger.
//!
//! Writes go through the repository functions; snapshot delivery rides a
//! `LISTEN/NOTIFY` trigger on the appointments table. A background watcher
//! task refetches the whole ledger on every notification and publishes it
//! over a `watch` channel, so every subscriber sees ordered, latest-wins
//! snapshots. If the listener connection drops, the ledger is marked
//! unhealthy and the watcher retries while subscribers keep the
//! last-known-good snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use eyre::Result;
use sqlx::postgres::PgListener;
use sqlx::{Pool, Postgres};
use tokio::sync::watch;
use tracing::{error, warn};
use uuid::Uuid;

use slotbook_core::errors::{BookingError, BookingResult};
use slotbook_core::ledger::{AppointmentLedger, LedgerSnapshot, LedgerSubscription};
use slotbook_core::models::{AppointmentStatus, NewAppointment};

use crate::repositories::appointments;
use crate::schema::APPOINTMENTS_CHANNEL;

const RECONNECT_DELAY: Duration = Duration::from_secs(5);

pub struct PgLedger {
    pool: Pool<Postgres>,
    snapshot_tx: watch::Sender<LedgerSnapshot>,
    healthy: Arc<AtomicBool>,
}

impl PgLedger {
    /// Fetch the initial snapshot and start the notification watcher.
    pub async fn connect(pool: Pool<Postgres>) -> Result<Arc<Self>> {
        let initial = fetch_domain_snapshot(&pool).await?;
        let (snapshot_tx, _) = watch::channel(initial);
        let healthy = Arc::new(AtomicBool::new(true));

        let ledger = Arc::new(Self {
            pool: pool.clone(),
            snapshot_tx: snapshot_tx.clone(),
            healthy: Arc::clone(&healthy),
        });

        tokio::spawn(watch_notifications(pool, snapshot_tx, healthy));

        Ok(ledger)
    }

    /// Refetch and publish the current snapshot. Called after local writes
    /// so in-process subscribers do not have to wait for the notification
    /// round-trip.
    async fn publish_snapshot(&self) -> Result<()> {
        let snapshot = fetch_domain_snapshot(&self.pool).await?;
        self.snapshot_tx.send_replace(snapshot);
        Ok(())
    }
}

async fn fetch_domain_snapshot(pool: &Pool<Postgres>) -> Result<LedgerSnapshot> {
    let rows = appointments::fetch_snapshot(pool).await?;
    Ok(rows.into_iter().map(|row| row.into_domain()).collect())
}

async fn watch_notifications(
    pool: Pool<Postgres>,
    snapshot_tx: watch::Sender<LedgerSnapshot>,
    healthy: Arc<AtomicBool>,
) {
    loop {
        if let Err(err) = listen_loop(&pool, &snapshot_tx, &healthy).await {
            healthy.store(false, Ordering::Relaxed);
            error!(%err, "ledger notification stream failed, retrying");
            tokio::time::sleep(RECONNECT_DELAY).await;
        }
    }
}

async fn listen_loop(
    pool: &Pool<Postgres>,
    snapshot_tx: &watch::Sender<LedgerSnapshot>,
    healthy: &AtomicBool,
) -> Result<()> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(APPOINTMENTS_CHANNEL).await?;
    healthy.store(true, Ordering::Relaxed);

    // Catch up on anything that changed before the listener was attached.
    let snapshot = fetch_domain_snapshot(pool).await?;
    snapshot_tx.send_replace(snapshot);

    loop {
        listener.recv().await?;
        let snapshot = fetch_domain_snapshot(pool).await?;
        snapshot_tx.send_replace(snapshot);
    }
}

#[async_trait]
impl AppointmentLedger for PgLedger {
    async fn create(&self, appointment: NewAppointment) -> BookingResult<Uuid> {
        let created = appointments::create_appointment(&self.pool, &appointment)
            .await
            .map_err(BookingError::Ledger)?;
        if let Err(err) = self.publish_snapshot().await {
            warn!(%err, "snapshot publish after create failed");
        }
        Ok(created.id)
    }

    async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> BookingResult<()> {
        let updated = appointments::update_appointment_status(&self.pool, id, status)
            .await
            .map_err(BookingError::Ledger)?;
        if !updated {
            return Err(BookingError::NotFound(format!(
                "Appointment with ID {id} not found"
            )));
        }
        if let Err(err) = self.publish_snapshot().await {
            warn!(%err, "snapshot publish after status update failed");
        }
        Ok(())
    }

    fn subscribe(&self) -> LedgerSubscription {
        LedgerSubscription::new(self.snapshot_tx.subscribe())
    }

    fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }
}
