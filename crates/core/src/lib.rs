//! # Slotbook Core
//!
//! Domain logic for the appointment booking service: availability state,
//! ledger synchronization, calendar grid classification, the booking
//! acceptance gate, and admin console operations.
//!
//! This crate has no database or HTTP dependencies. The appointment ledger
//! and the persisted key-value store are consumed through the traits in
//! [`ledger`] and [`kv`]; concrete backends live in the `slotbook-db` crate.

pub mod admin;
pub mod availability;
pub mod booking;
pub mod calendar;
pub mod errors;
pub mod kv;
pub mod ledger;
pub mod models;
pub mod pricing;
pub mod sync;
