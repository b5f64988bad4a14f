//! # Admin console operations
//!
//! Privileged view over the appointment ledger and the availability store:
//! status transitions, manual date overrides, manual bookings, filtered
//! booking lists, and dashboard statistics. Reads come from the
//! synchronizer's last-known-good snapshot, so the dashboard keeps working
//! when the ledger connection degrades.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::errors::{BookingError, BookingResult};
use crate::ledger::AppointmentLedger;
use crate::models::day::{DateStatus, SlotId};
use crate::models::{Appointment, AppointmentStatus, NewAppointment};
use crate::pricing::PriceBook;
use crate::sync::AvailabilitySync;

/// Created-at window for the booking list filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CreatedWindow {
    Today,
    Week,
    Month,
}

/// Filter over the booking list. All criteria are conjunctive; `search`
/// matches name, email and phone case-insensitively.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingFilter {
    pub status: Option<AppointmentStatus>,
    pub created_within: Option<CreatedWindow>,
    pub search: Option<String>,
}

/// Dashboard headline numbers. Outstanding revenue sums the estimated
/// value of every booking that is neither cancelled nor completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total: usize,
    pub new_count: usize,
    pub confirmed_count: usize,
    pub outstanding_revenue: u32,
}

/// Customer details for a booking entered by the admin on a customer's
/// behalf (for example one taken over the phone).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualBooking {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: String,
    pub service: String,
    #[serde(default)]
    pub addons: Vec<String>,
    pub message: Option<String>,
}

pub struct AdminConsole {
    sync: Arc<AvailabilitySync>,
    ledger: Arc<dyn AppointmentLedger>,
    prices: PriceBook,
}

impl AdminConsole {
    pub fn new(
        sync: Arc<AvailabilitySync>,
        ledger: Arc<dyn AppointmentLedger>,
        prices: PriceBook,
    ) -> Self {
        Self { sync, ledger, prices }
    }

    /// Transition a booking to any status. Cancelling or completing frees
    /// its slot on the next synchronization pass; the ledger document
    /// itself is never deleted.
    pub async fn set_status(&self, id: Uuid, status: AppointmentStatus) -> BookingResult<()> {
        self.ledger.set_status(id, status).await?;
        info!(%id, %status, "booking status updated");
        Ok(())
    }

    pub fn force_date_open(&self, date: NaiveDate) {
        self.sync.store().set_day_availability(date, true);
    }

    /// Closing a date only blocks new bookings; existing appointments on it
    /// are left untouched.
    pub fn force_date_closed(&self, date: NaiveDate) {
        self.sync.store().set_day_availability(date, false);
    }

    pub fn set_capacity(&self, capacity: u32) -> BookingResult<()> {
        self.sync.store().set_capacity(capacity)
    }

    /// Book a slot on a customer's behalf. The date must already be open
    /// (closed dates need `force_date_open` first) and below capacity.
    pub async fn add_manual_booking(
        &self,
        date: NaiveDate,
        slot: SlotId,
        details: ManualBooking,
    ) -> BookingResult<Uuid> {
        match self.sync.date_status(date) {
            DateStatus::Unavailable => {
                return Err(BookingError::DateUnavailable(format!(
                    "{date} is closed; open it before adding bookings"
                )));
            }
            DateStatus::Full => {
                return Err(BookingError::CapacityExceeded(format!(
                    "{date} is fully booked"
                )));
            }
            DateStatus::Available | DateStatus::Partial => {}
        }

        let id = self
            .ledger
            .create(NewAppointment {
                name: details.name,
                email: details.email,
                phone: details.phone,
                address: details.address,
                service_date: Some(date),
                service_time: Some(slot.service_time().to_string()),
                service: details.service,
                addons: details.addons,
                message: details.message,
            })
            .await?;
        info!(%id, %date, %slot, "manual booking added");
        Ok(id)
    }

    /// Bookings matching a filter, newest first.
    pub fn filter_bookings(&self, filter: &BookingFilter) -> Vec<Appointment> {
        self.filter_bookings_at(filter, Utc::now())
    }

    pub fn filter_bookings_at(
        &self,
        filter: &BookingFilter,
        now: chrono::DateTime<Utc>,
    ) -> Vec<Appointment> {
        let search = filter.search.as_deref().map(str::to_lowercase);
        let mut bookings: Vec<Appointment> = self
            .sync
            .all_appointments()
            .into_iter()
            .filter(|booking| {
                if let Some(status) = filter.status {
                    if booking.status != status {
                        return false;
                    }
                }
                if let Some(window) = filter.created_within {
                    let cutoff_ok = match window {
                        CreatedWindow::Today => booking.created_at.date_naive() == now.date_naive(),
                        CreatedWindow::Week => booking.created_at >= now - Duration::days(7),
                        CreatedWindow::Month => booking.created_at >= now - Duration::days(30),
                    };
                    if !cutoff_ok {
                        return false;
                    }
                }
                if let Some(term) = &search {
                    let haystack = format!(
                        "{} {} {}",
                        booking.name,
                        booking.email,
                        booking.phone.as_deref().unwrap_or("")
                    )
                    .to_lowercase();
                    if !haystack.contains(term) {
                        return false;
                    }
                }
                true
            })
            .collect();
        bookings.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        bookings
    }

    pub fn statistics(&self) -> DashboardStats {
        let bookings = self.sync.all_appointments();
        let outstanding_revenue = bookings
            .iter()
            .filter(|b| b.status.is_active())
            .map(|b| self.prices.booking_value(&b.service, &b.addons))
            .sum();
        DashboardStats {
            total: bookings.len(),
            new_count: bookings
                .iter()
                .filter(|b| b.status == AppointmentStatus::New)
                .count(),
            confirmed_count: bookings
                .iter()
                .filter(|b| b.status == AppointmentStatus::Confirmed)
                .count(),
            outstanding_revenue,
        }
    }

    /// Estimated value of one booking, for the detail view.
    pub fn booking_value(&self, booking: &Appointment) -> u32 {
        self.prices.booking_value(&booking.service, &booking.addons)
    }

    /// Regenerate the default weekday horizon, discarding manual overrides.
    /// Returns the number of open dates generated.
    pub fn reset_availability(&self) -> usize {
        let count = self.sync.store().reset_to_defaults();
        info!(open_dates = count, "availability reset to weekday defaults");
        count
    }

    pub fn prices(&self) -> &PriceBook {
        &self.prices
    }
}
