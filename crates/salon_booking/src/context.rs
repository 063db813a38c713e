// --- File: crates/salon_booking/src/context.rs ---
//! Settings and collaborators shared by every part of the engine.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use salon_common::{
    BoxFuture, CalendarProvider, DirectoryStore, Notifier, ReservationStore, ServiceError,
};
use salon_config::{AppConfig, BusinessConfig, BusyFetchFailure};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::BookingError;
use crate::opening_hours::HoursPolicy;

/// Booking policy resolved from `AppConfig` once at startup.
#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub time_zone: Tz,
    pub event_tag: String,
    pub default_professional_name: String,
    /// Site-wide calendar used when a request names neither professional nor service.
    pub default_calendar: Option<String>,
    pub min_notice_minutes: i64,
    pub upstream_timeout: Duration,
    pub busy_fetch_failure: BusyFetchFailure,
    pub untagged_service_fallback: bool,
    pub hours_policy: HoursPolicy,
    pub shuffle_seed: Option<u64>,
    pub side_effect_attempts: u32,
    pub max_duration_minutes: i64,
    pub owner_email: Option<String>,
    pub business: BusinessConfig,
}

impl BookingSettings {
    pub fn from_config(config: &AppConfig) -> Result<Self, BookingError> {
        let booking = &config.booking;
        let time_zone = Tz::from_str(&booking.time_zone).map_err(|_| {
            BookingError::Configuration(format!("unknown time zone '{}'", booking.time_zone))
        })?;

        Ok(Self {
            time_zone,
            event_tag: booking.event_tag.clone(),
            default_professional_name: booking.default_professional_name.clone(),
            default_calendar: config
                .gcal
                .as_ref()
                .and_then(|g| g.calendar_id.clone())
                .filter(|id| !id.trim().is_empty()),
            min_notice_minutes: booking.min_notice_minutes.max(0),
            upstream_timeout: Duration::from_millis(booking.upstream_timeout_ms.max(1)),
            busy_fetch_failure: booking.busy_fetch_failure,
            untagged_service_fallback: booking.untagged_service_fallback,
            hours_policy: HoursPolicy {
                assume_open_when_unknown: booking.assume_open_when_hours_unknown,
                assume_business_hours: booking.assume_business_hours_for_unlisted_days,
            },
            shuffle_seed: booking.shuffle_seed,
            side_effect_attempts: booking.side_effect_attempts.max(1),
            max_duration_minutes: booking.max_duration_minutes,
            owner_email: config
                .mail
                .as_ref()
                .and_then(|m| m.owner_email.clone())
                .filter(|e| !e.trim().is_empty()),
            business: config.business.clone(),
        })
    }

    /// Converts a wall-clock time in the business zone to UTC. `None` inside a DST gap;
    /// an ambiguous time (DST fold) resolves to the earlier instant.
    pub fn local_instant(&self, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
        local_instant(&self.time_zone, date, time)
    }
}

pub fn local_instant(tz: &Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|at| at.with_timezone(&Utc))
}

/// Settings plus the collaborator handles the engine talks to.
pub struct BookingContext {
    pub settings: BookingSettings,
    /// `None` when no calendar integration is configured.
    pub calendar: Option<Arc<dyn CalendarProvider>>,
    pub directory: Arc<dyn DirectoryStore>,
    pub reservations: Arc<dyn ReservationStore>,
    /// `None` when mail is disabled.
    pub notifier: Option<Arc<dyn Notifier>>,
}

impl BookingContext {
    /// Calendar handle or a configuration error.
    pub fn calendar(&self) -> Result<&Arc<dyn CalendarProvider>, BookingError> {
        self.calendar.as_ref().ok_or_else(|| {
            BookingError::Configuration("no calendar provider configured".to_string())
        })
    }

    /// Runs an upstream call under the configured timeout.
    pub async fn bounded<T>(&self, call: BoxFuture<'_, T, ServiceError>) -> Result<T, ServiceError> {
        tokio::time::timeout(self.settings.upstream_timeout, call)
            .await
            .map_err(|_| {
                ServiceError::TimeoutError(format!(
                    "no answer within {} ms",
                    self.settings.upstream_timeout.as_millis()
                ))
            })?
    }
}
