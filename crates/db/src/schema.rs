use eyre::Result;
use sqlx::{Pool, Postgres};
use tracing::info;

/// Notification channel the appointments trigger publishes on; the ledger
/// watcher listens here.
pub const APPOINTMENTS_CHANNEL: &str = "appointments_changed";

pub async fn initialize_database(pool: &Pool<Postgres>) -> Result<()> {
    info!("Initializing database schema...");

    // Create appointments table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS appointments (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            phone VARCHAR(64) NULL,
            address TEXT NOT NULL,
            service_date DATE NULL,
            service_time VARCHAR(64) NULL,
            service VARCHAR(64) NOT NULL,
            addons TEXT NULL,
            message TEXT NULL,
            status VARCHAR(32) NOT NULL DEFAULT 'new',
            created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
            updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
        );
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes
    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_appointments_service_date ON appointments(service_date);
        CREATE INDEX IF NOT EXISTS idx_appointments_status ON appointments(status);
        CREATE INDEX IF NOT EXISTS idx_appointments_created_at ON appointments(created_at);
        "#,
    )
    .execute(pool)
    .await?;

    // Notify listeners on any appointment change so connected ledger
    // watchers can refetch their snapshot
    sqlx::query(
        r#"
        CREATE OR REPLACE FUNCTION notify_appointments_changed() RETURNS trigger AS $$
        BEGIN
            PERFORM pg_notify('appointments_changed', '');
            RETURN NULL;
        END;
        $$ LANGUAGE plpgsql;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        DROP TRIGGER IF EXISTS appointments_changed ON appointments;
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TRIGGER appointments_changed
        AFTER INSERT OR UPDATE OR DELETE ON appointments
        FOR EACH STATEMENT
        EXECUTE FUNCTION notify_appointments_changed();
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database schema initialized successfully.");
    Ok(())
}
