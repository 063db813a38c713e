// --- File: crates/salon_common/src/models.rs ---
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::interval::TimeInterval;

/// A bookable staff member. `calendar_ref` is opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Professional {
    pub name: String,
    pub calendar_ref: String,
    #[serde(default)]
    pub services: BTreeSet<String>,
}

impl Professional {
    pub fn new(name: impl Into<String>, calendar_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            calendar_ref: calendar_ref.into(),
            services: BTreeSet::new(),
        }
    }

    pub fn with_services<I, S>(mut self, services: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.services.extend(services.into_iter().map(Into::into));
        self
    }

    /// Service names are compared trimmed and case-insensitively.
    pub fn offers(&self, service: &str) -> bool {
        let wanted = service.trim();
        self.services
            .iter()
            .any(|s| s.trim().eq_ignore_ascii_case(wanted))
    }
}

/// Outcome of reading the raw opening-hours setting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoursSetting {
    /// No row / empty value.
    Absent,
    /// The store could not be read.
    Failed,
    Present(String),
}

/// Customer contact as written by the booking side effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactRecord {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Result of an upsert: the stored row id and whether it was newly inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactUpsert {
    pub id: i64,
    pub created: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCalendarEvent {
    pub interval: TimeInterval,
    pub title: String,
    pub description: String,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub interval: Option<TimeInterval>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.interval.is_none() && self.title.is_none() && self.description.is_none()
    }
}

/// An event as read back from a calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarEntry {
    pub event_id: String,
    pub title: String,
    pub description: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// An outgoing email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Identifier of a reservation hold.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HoldId(pub String);

impl std::fmt::Display for HoldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
