use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a booking request.
///
/// Any status is reachable from any status; there is no enforced order.
/// `Cancelled` and `Completed` both remove the appointment from slot
/// occupancy on the next synchronization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AppointmentStatus {
    New,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Active appointments occupy a time slot; cancelled and completed ones
    /// do not.
    pub fn is_active(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled | AppointmentStatus::Completed)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AppointmentStatus::New => "new",
            AppointmentStatus::Confirmed => "confirmed",
            AppointmentStatus::InProgress => "in-progress",
            AppointmentStatus::Completed => "completed",
            AppointmentStatus::Cancelled => "cancelled",
        };
        write!(f, "{s}")
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(AppointmentStatus::New),
            "confirmed" => Ok(AppointmentStatus::Confirmed),
            "in-progress" => Ok(AppointmentStatus::InProgress),
            "completed" => Ok(AppointmentStatus::Completed),
            "cancelled" => Ok(AppointmentStatus::Cancelled),
            other => Err(format!("unknown appointment status: {other}")),
        }
    }
}

/// One customer booking request as stored in the appointment ledger.
///
/// `service_date` and `service_time` are optional: quote requests and legacy
/// records may carry neither, and such appointments never occupy a slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service_date: Option<NaiveDate>,
    pub service_time: Option<String>,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields supplied by the caller when creating an appointment. Identity,
/// status and both timestamps are assigned by the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAppointment {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service_date: Option<NaiveDate>,
    pub service_time: Option<String>,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
}
