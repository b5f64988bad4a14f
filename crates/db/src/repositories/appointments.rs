use crate::models::{join_addons, DbAppointment};
use eyre::Result;
use slotbook_core::models::{AppointmentStatus, NewAppointment};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

const APPOINTMENT_COLUMNS: &str = "id, name, email, phone, address, service_date, service_time, \
     service, addons, message, status, created_at, updated_at";

pub async fn create_appointment(
    pool: &Pool<Postgres>,
    appointment: &NewAppointment,
) -> Result<DbAppointment> {
    let id = Uuid::new_v4();

    tracing::debug!(
        "Creating appointment: id={}, service={}, date={:?}",
        id,
        appointment.service,
        appointment.service_date
    );

    let created = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        INSERT INTO appointments
            (id, name, email, phone, address, service_date, service_time,
             service, addons, message, status, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, 'new', NOW(), NOW())
        RETURNING {APPOINTMENT_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(&appointment.name)
    .bind(&appointment.email)
    .bind(&appointment.phone)
    .bind(&appointment.address)
    .bind(appointment.service_date)
    .bind(&appointment.service_time)
    .bind(&appointment.service)
    .bind(join_addons(&appointment.addons))
    .bind(&appointment.message)
    .fetch_one(pool)
    .await?;

    Ok(created)
}

/// Transition an appointment's status. `updated_at` is assigned by the
/// database, never from the caller's clock. Returns false when no row
/// matched.
pub async fn update_appointment_status(
    pool: &Pool<Postgres>,
    id: Uuid,
    status: AppointmentStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE appointments
        SET status = $2, updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(status.to_string())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// The whole ledger, newest first. Appointments are never deleted, so this
/// is the complete booking history.
pub async fn fetch_snapshot(pool: &Pool<Postgres>) -> Result<Vec<DbAppointment>> {
    let appointments = sqlx::query_as::<_, DbAppointment>(&format!(
        r#"
        SELECT {APPOINTMENT_COLUMNS}
        FROM appointments
        ORDER BY created_at DESC
        "#
    ))
    .fetch_all(pool)
    .await?;

    Ok(appointments)
}
