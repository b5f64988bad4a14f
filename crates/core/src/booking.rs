//! # Booking acceptance gate
//!
//! Validates a booking request against the form's field rules and the live
//! availability state, then authorizes the ledger write. Rejections are
//! returned synchronously so the caller can surface them next to the form
//! field or calendar that caused them.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::ledger::AppointmentLedger;
use crate::models::day::SlotId;
use crate::models::NewAppointment;
use crate::sync::AvailabilitySync;

/// A customer booking request as it leaves the form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingRequest {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub date: Option<NaiveDate>,
    pub slot: Option<SlotId>,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
}

fn looks_like_email(value: &str) -> bool {
    if value.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

/// Field-level validation, mirroring the public form's rules.
pub fn validate_fields(request: &BookingRequest) -> BookingResult<()> {
    if request.name.trim().len() < 2 {
        return Err(BookingError::Validation(
            "name must be at least 2 characters long".to_string(),
        ));
    }
    if !looks_like_email(request.email.trim()) {
        return Err(BookingError::Validation(
            "a valid email address is required".to_string(),
        ));
    }
    if let Some(phone) = &request.phone {
        let phone = phone.trim();
        if !phone.is_empty() && phone.len() < 10 {
            return Err(BookingError::Validation(
                "phone number looks too short".to_string(),
            ));
        }
    }
    if request.address.trim().len() < 5 {
        return Err(BookingError::Validation(
            "a complete address is required".to_string(),
        ));
    }
    if request.service.trim().is_empty() {
        return Err(BookingError::Validation("a service must be selected".to_string()));
    }
    Ok(())
}

/// The gate between the booking form and the appointment ledger.
pub struct BookingDesk {
    sync: Arc<AvailabilitySync>,
    ledger: Arc<dyn AppointmentLedger>,
}

impl BookingDesk {
    pub fn new(sync: Arc<AvailabilitySync>, ledger: Arc<dyn AppointmentLedger>) -> Self {
        Self { sync, ledger }
    }

    /// Check that `(date, slot)` can accept a booking right now. Returns
    /// the confirmed date on success.
    pub fn authorize(&self, date: Option<NaiveDate>, slot: Option<SlotId>) -> BookingResult<NaiveDate> {
        self.authorize_on(date, slot, Utc::now().date_naive())
    }

    pub fn authorize_on(
        &self,
        date: Option<NaiveDate>,
        slot: Option<SlotId>,
        today: NaiveDate,
    ) -> BookingResult<NaiveDate> {
        let date = date.ok_or_else(|| {
            BookingError::Validation("a service date must be selected".to_string())
        })?;
        let slot = slot.ok_or(BookingError::MissingSlot)?;
        if date < today {
            return Err(BookingError::DateUnavailable(
                "service date cannot be in the past".to_string(),
            ));
        }
        if !self.sync.is_date_bookable_on(date, today) {
            return Err(BookingError::DateUnavailable(format!(
                "{date} is not open for booking"
            )));
        }
        if self.sync.is_slot_booked(date, slot) {
            return Err(BookingError::DateUnavailable(format!(
                "the {slot} slot on {date} is already booked"
            )));
        }
        Ok(date)
    }

    /// Validate, authorize, and write the appointment with status `new`.
    pub async fn submit(&self, request: BookingRequest) -> BookingResult<Uuid> {
        validate_fields(&request)?;
        let slot = request.slot.ok_or(BookingError::MissingSlot)?;
        let date = self.authorize(request.date, Some(slot))?;

        let id = self
            .ledger
            .create(NewAppointment {
                name: request.name.trim().to_string(),
                email: request.email.trim().to_string(),
                phone: request.phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty()),
                address: request.address.trim().to_string(),
                service_date: Some(date),
                service_time: Some(slot.service_time().to_string()),
                service: request.service,
                addons: request.addons,
                message: request.message,
            })
            .await?;

        info!(%id, %date, %slot, "booking request accepted");
        Ok(id)
    }
}
