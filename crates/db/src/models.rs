use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use slotbook_core::models::{Appointment, AppointmentStatus};
use sqlx::FromRow;
use tracing::warn;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DbAppointment {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service_date: Option<NaiveDate>,
    pub service_time: Option<String>,
    pub service: String,
    pub addons: Option<String>,
    pub message: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DbAppointment {
    /// Convert a row into the domain model. Add-ons are stored
    /// comma-joined; an unknown status string reads as `new` so one bad row
    /// cannot take down a synchronization pass.
    pub fn into_domain(self) -> Appointment {
        let status = self.status.parse().unwrap_or_else(|_| {
            warn!(id = %self.id, status = %self.status, "unknown appointment status, treating as new");
            AppointmentStatus::New
        });
        Appointment {
            id: self.id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            address: self.address,
            service_date: self.service_date,
            service_time: self.service_time,
            service: self.service,
            addons: split_addons(self.addons.as_deref()),
            message: self.message,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

pub fn split_addons(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

pub fn join_addons(addons: &[String]) -> Option<String> {
    if addons.is_empty() {
        None
    } else {
        Some(addons.join(","))
    }
}
