// --- File: crates/salon_booking/src/availability.rs ---
//! Bookable slots for one day.
//!
//! [`compute_slots`] is pure: opening hours plus everybody's busy intervals in, slots out.
//! [`AvailabilityService`] does the I/O around it (eligibility, opening-hours lookup and a
//! parallel busy fan-out with per-professional failure isolation).

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use futures::future::join_all;
use salon_common::{overlaps_any, HoursSetting, Professional, TimeInterval};
use salon_config::BusyFetchFailure;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::{local_instant, BookingContext};
use crate::eligibility::{self, EligibilityFilter};
use crate::error::BookingError;
use crate::opening_hours::{hours_for_day, DayHours, BUCKETS, FIRST_HOUR};
use crate::validation;

/// Minutes between candidate start times.
pub const SLOT_STEP_MINUTES: u32 = 30;
/// First candidate start, 08:00.
const FIRST_START_MINUTE: u32 = FIRST_HOUR * 60;
/// Candidates start before 21:00, so the last one is 20:30.
const START_LIMIT_MINUTE: u32 = (FIRST_HOUR + BUCKETS as u32) * 60;

/// A professional's engagements for the queried window.
#[derive(Debug, Clone)]
pub struct BusyRecord {
    pub professional: Professional,
    pub busy: Vec<TimeInterval>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Slot {
    /// Local start time, `HH:MM`.
    #[cfg_attr(feature = "openapi", schema(example = "10:30"))]
    pub time: String,
    /// Free professionals, in candidate order.
    pub available_professionals: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DaySlots {
    /// No opening hour at all on this day.
    pub closed: bool,
    pub slots: Vec<Slot>,
}

/// Slots for `date` in zone `tz`.
///
/// Candidates start every 30 minutes from 08:00 up to and including 20:30. A candidate
/// `[s, s + duration)` is offered only if every hour bucket it touches lies in the grid and
/// is open, and at least one professional has no busy interval overlapping it.
pub fn compute_slots(
    date: NaiveDate,
    duration_minutes: i64,
    hours: &DayHours,
    busy_records: &[BusyRecord],
    tz: &Tz,
) -> DaySlots {
    if !hours.iter().any(|open| *open) {
        return DaySlots {
            closed: true,
            slots: Vec::new(),
        };
    }
    // nothing longer than the grid can fit
    if duration_minutes <= 0 || duration_minutes > i64::from(BUCKETS as u32 * 60) {
        return DaySlots::default();
    }

    let duration = Duration::minutes(duration_minutes);
    let mut slots = Vec::new();

    for start_minute in (FIRST_START_MINUTE..START_LIMIT_MINUTE).step_by(SLOT_STEP_MINUTES as usize) {
        if !window_is_open(hours, start_minute, duration_minutes) {
            continue;
        }
        let Some(local_start) = NaiveTime::from_hms_opt(start_minute / 60, start_minute % 60, 0)
        else {
            continue;
        };
        // DST gap: the wall-clock time does not exist
        let Some(start) = local_instant(tz, date, local_start) else {
            continue;
        };
        let Ok(window) = TimeInterval::starting_at(start, duration) else {
            continue;
        };

        let free: Vec<String> = busy_records
            .iter()
            .filter(|record| !overlaps_any(&window, &record.busy))
            .map(|record| record.professional.name.trim().to_string())
            .collect();

        if !free.is_empty() {
            slots.push(Slot {
                time: format!("{:02}:{:02}", local_start.hour(), local_start.minute()),
                available_professionals: free,
            });
        }
    }

    DaySlots {
        closed: false,
        slots,
    }
}

/// Every hour bucket touched by `[start, start + duration)` must be inside the grid and open.
fn window_is_open(hours: &DayHours, start_minute: u32, duration_minutes: i64) -> bool {
    let end_minute = i64::from(start_minute) + duration_minutes;
    let first_hour = i64::from(start_minute / 60);
    let last_hour = (end_minute - 1) / 60;
    (first_hour..=last_hour).all(|hour| {
        let bucket = hour - i64::from(FIRST_HOUR);
        (0..BUCKETS as i64).contains(&bucket) && hours[bucket as usize]
    })
}

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams, utoipa::ToSchema))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct AvailabilityQuery {
    /// Day in YYYY-MM-DD format
    #[cfg_attr(feature = "openapi", schema(format = "date", example = "2031-03-04"))]
    pub date: String,
    /// Service length in minutes
    #[cfg_attr(feature = "openapi", schema(example = 60))]
    pub duration_minutes: i64,
    pub professional: Option<String>,
    pub service: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AvailabilityResponse {
    pub date: String,
    pub duration_minutes: i64,
    pub closed: bool,
    /// Set when slots could not be computed and an empty list is returned instead.
    pub warning: Option<String>,
    pub slots: Vec<Slot>,
}

pub struct AvailabilityService {
    context: Arc<BookingContext>,
}

impl AvailabilityService {
    pub fn new(context: Arc<BookingContext>) -> Self {
        Self { context }
    }

    /// Slots for the query, hiding starts earlier than `now` plus the minimum notice.
    pub async fn slots(
        &self,
        query: &AvailabilityQuery,
        now: DateTime<Utc>,
    ) -> Result<AvailabilityResponse, BookingError> {
        let settings = &self.context.settings;
        let date = validation::parse_date(&query.date)?;
        validation::check_duration(query.duration_minutes, settings.max_duration_minutes)?;

        let mut response = AvailabilityResponse {
            date: date.format("%Y-%m-%d").to_string(),
            duration_minutes: query.duration_minutes,
            closed: false,
            warning: None,
            slots: Vec::new(),
        };

        let Some(calendar) = self.context.calendar.as_ref() else {
            warn!("Availability requested without a calendar provider");
            response.warning = Some("calendar_unavailable".to_string());
            return Ok(response);
        };

        let filter = EligibilityFilter::new(query.professional.as_deref(), query.service.as_deref());
        let candidates =
            match eligibility::resolve(self.context.directory.as_ref(), settings, &filter).await {
                Ok(candidates) => candidates,
                Err(BookingError::Configuration(reason)) => {
                    warn!(reason = %reason, "Availability requested without a usable configuration");
                    response.warning = Some("configuration".to_string());
                    return Ok(response);
                }
                Err(e) => return Err(e),
            };

        let setting = match self.context.bounded(self.context.directory.opening_hours()).await {
            Ok(setting) => setting,
            Err(e) => {
                warn!(error = %e, "Opening hours lookup failed");
                HoursSetting::Failed
            }
        };
        let hours = hours_for_day(&setting, date.weekday(), &self.context.settings.hours_policy);
        if !hours.iter().any(|open| *open) {
            info!(date = %date, "Closed all day");
            response.closed = true;
            return Ok(response);
        }

        let (from, to) = self.fetch_window(date, query.duration_minutes)?;
        let fetches = candidates.into_iter().map(|professional| {
            let context = &self.context;
            async move {
                let result = context
                    .bounded(calendar.list_busy(&professional.calendar_ref, from, to))
                    .await;
                let busy = match result {
                    Ok(busy) => busy,
                    Err(e) => {
                        warn!(
                            professional = %professional.name,
                            calendar_ref = %professional.calendar_ref,
                            start = %from,
                            end = %to,
                            error = %e,
                            policy = ?context.settings.busy_fetch_failure,
                            "Busy lookup failed"
                        );
                        unreachable_calendar_busy(context.settings.busy_fetch_failure, from, to)
                    }
                };
                BusyRecord { professional, busy }
            }
        });
        let busy_records = join_all(fetches).await;

        let day = compute_slots(
            date,
            query.duration_minutes,
            &hours,
            &busy_records,
            &settings.time_zone,
        );
        let not_before = now + Duration::minutes(settings.min_notice_minutes);
        response.closed = day.closed;
        response.slots = day
            .slots
            .into_iter()
            .filter(|slot| {
                validation::parse_time(&slot.time)
                    .ok()
                    .and_then(|time| settings.local_instant(date, time))
                    .is_some_and(|start| start >= not_before)
            })
            .collect();

        debug!(date = %date, slots = response.slots.len(), "Availability computed");
        Ok(response)
    }

    /// Span from the first candidate start to the end of the last one.
    fn fetch_window(
        &self,
        date: NaiveDate,
        duration_minutes: i64,
    ) -> Result<(DateTime<Utc>, DateTime<Utc>), BookingError> {
        let settings = &self.context.settings;
        let day_start = NaiveTime::from_hms_opt(FIRST_HOUR, 0, 0)
            .and_then(|t| settings.local_instant(date, t));
        let last_start = NaiveTime::from_hms_opt(
            (START_LIMIT_MINUTE - SLOT_STEP_MINUTES) / 60,
            (START_LIMIT_MINUTE - SLOT_STEP_MINUTES) % 60,
            0,
        )
        .and_then(|t| settings.local_instant(date, t));
        match (day_start, last_start) {
            (Some(from), Some(last)) => Ok((from, last + Duration::minutes(duration_minutes))),
            _ => Err(BookingError::validation("date", "has no business hours in this time zone")),
        }
    }
}

/// Busy list substituted for a professional whose calendar could not be read.
pub fn unreachable_calendar_busy(
    policy: BusyFetchFailure,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Vec<TimeInterval> {
    match policy {
        BusyFetchFailure::Busy => TimeInterval::new(from, to).into_iter().collect(),
        BusyFetchFailure::Free => Vec::new(),
    }
}
