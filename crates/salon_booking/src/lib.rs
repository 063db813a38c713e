// --- File: crates/salon_booking/src/lib.rs ---
//! Availability and booking assignment for a multi-professional salon.
//!
//! [`availability`] answers "which start times are free, and with whom" for one day;
//! [`assigner`] turns a chosen start time into a calendar event on exactly one professional.
//! Both read the same directory, opening hours and calendars through the collaborator traits
//! of `salon_common`, wired together in a [`context::BookingContext`].

pub mod admin;
pub mod assigner;
pub mod availability;
#[cfg(test)]
mod availability_proptest;
pub mod context;
pub mod doc;
pub mod eligibility;
pub mod error;
pub mod event_format;
pub mod handlers;
pub mod opening_hours;
#[cfg(test)]
mod opening_hours_test;
pub mod reservation;
pub mod routes;
pub mod validation;

pub use assigner::{Assignment, BookingAssigner, BookingRequest, Customer};
pub use availability::{compute_slots, AvailabilityService, BusyRecord, DaySlots, Slot};
pub use context::{BookingContext, BookingSettings};
pub use eligibility::EligibilityFilter;
pub use error::{BookingError, EligibilityReason};
pub use opening_hours::HoursPolicy;
pub use handlers::BookingState;
pub use reservation::InMemoryReservationStore;
