// --- File: crates/salon_common/src/services.rs ---
//! Collaborator traits consumed by the booking engine.
//!
//! Every concrete integration (Google Calendar, SQL store, mail API, in-memory fakes in tests)
//! implements one of these so the engine can be wired with `Arc<dyn Trait>`.

use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

use crate::error::ServiceError;
use crate::interval::TimeInterval;
use crate::models::{
    CalendarEntry, ContactRecord, ContactUpsert, EmailMessage, EventPatch, HoldId, HoursSetting,
    NewCalendarEvent, Professional,
};

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

pub trait CalendarProvider: Send + Sync {
    /// Busy intervals of `calendar_ref` intersecting `[from, to)`.
    fn list_busy(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<TimeInterval>, ServiceError>;

    /// Creates the event and returns its id.
    fn insert_event(
        &self,
        calendar_ref: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, String, ServiceError>;

    fn update_event(
        &self,
        calendar_ref: &str,
        event_id: &str,
        patch: EventPatch,
    ) -> BoxFuture<'_, (), ServiceError>;

    fn delete_event(&self, calendar_ref: &str, event_id: &str) -> BoxFuture<'_, (), ServiceError>;

    /// Non-cancelled events of `calendar_ref` intersecting `[from, to)`.
    fn list_events(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEntry>, ServiceError>;
}

pub trait DirectoryStore: Send + Sync {
    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, ServiceError>;

    /// Exact name match after trimming.
    fn find_professional(&self, name: &str) -> BoxFuture<'_, Option<Professional>, ServiceError>;

    /// Raw opening-hours text. Callers map an `Err` to [`HoursSetting::Failed`].
    fn opening_hours(&self) -> BoxFuture<'_, HoursSetting, ServiceError>;

    /// Upserts by email, or by phone when email is absent.
    fn upsert_contact(&self, contact: ContactRecord) -> BoxFuture<'_, ContactUpsert, ServiceError>;
}

pub trait Notifier: Send + Sync {
    fn send(&self, message: EmailMessage) -> BoxFuture<'_, (), ServiceError>;
}

/// Short-lived exclusive claims on a calendar window.
pub trait ReservationStore: Send + Sync {
    /// Claims `interval` on `calendar_ref`. `None` when an unexpired overlapping hold exists.
    fn try_hold(
        &self,
        calendar_ref: &str,
        interval: TimeInterval,
    ) -> BoxFuture<'_, Option<HoldId>, ServiceError>;

    fn release(&self, hold: &HoldId) -> BoxFuture<'_, (), ServiceError>;
}
