// --- File: crates/salon_booking/src/admin.rs ---
//! Salon-side view of booked appointments: listing, cancelling and moving them.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use futures::future::join_all;
use salon_common::{overlaps_any, EventPatch, Professional, TimeInterval};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::context::BookingContext;
use crate::eligibility;
use crate::error::{BookingError, EligibilityReason};
use crate::event_format::{parse_booking, BookingSummary};
use crate::validation;

#[derive(Debug, Clone, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct BookingListQuery {
    /// First day, inclusive (YYYY-MM-DD)
    pub start_date: String,
    /// Last day, inclusive (YYYY-MM-DD)
    pub end_date: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingList {
    pub bookings: Vec<BookingSummary>,
    /// Calendars that could not be read; their bookings are missing from the list.
    pub unreachable: Vec<String>,
}

/// Changes to an existing booking. `date`, `time` and `duration_minutes` move it and must
/// come together; `title` renames it.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingUpdate {
    pub date: Option<String>,
    pub time: Option<String>,
    pub duration_minutes: Option<i64>,
    pub title: Option<String>,
}

pub struct BookingAdmin {
    context: Arc<BookingContext>,
}

impl BookingAdmin {
    pub fn new(context: Arc<BookingContext>) -> Self {
        Self { context }
    }

    /// Tagged events of every known calendar between two local dates, sorted by start.
    pub async fn list_bookings(&self, query: &BookingListQuery) -> Result<BookingList, BookingError> {
        let settings = &self.context.settings;
        let first = validation::parse_date(&query.start_date)?;
        let last = validation::parse_date(&query.end_date)
            .map_err(|_| BookingError::validation("end_date", "expected YYYY-MM-DD"))?;
        if last < first {
            return Err(BookingError::validation("end_date", "is before start_date"));
        }
        let calendar = self.context.calendar()?;

        let from = settings
            .local_instant(first, NaiveTime::MIN)
            .unwrap_or_else(|| first.and_time(NaiveTime::MIN).and_utc());
        let to = last
            .succ_opt()
            .and_then(|next| settings.local_instant(next, NaiveTime::MIN))
            .unwrap_or_else(|| from + Duration::days((last - first).num_days() + 1));

        let owners = self.calendars().await?;
        let reads = owners.iter().map(|owner| async move {
            let result = self
                .context
                .bounded(calendar.list_events(&owner.calendar_ref, from, to))
                .await;
            (owner, result)
        });

        let mut list = BookingList {
            bookings: Vec::new(),
            unreachable: Vec::new(),
        };
        for (owner, result) in join_all(reads).await {
            match result {
                Ok(entries) => list.bookings.extend(
                    entries
                        .iter()
                        .filter_map(|entry| parse_booking(&settings.event_tag, &owner.name, entry)),
                ),
                Err(e) => {
                    warn!(
                        professional = %owner.name,
                        calendar_ref = %owner.calendar_ref,
                        start = %from,
                        end = %to,
                        error = %e,
                        "Listing events failed"
                    );
                    list.unreachable.push(owner.name.clone());
                }
            }
        }
        list.bookings
            .sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.event_id.cmp(&b.event_id)));
        debug!(count = list.bookings.len(), "Bookings listed");
        Ok(list)
    }

    pub async fn cancel(&self, professional: &str, event_id: &str) -> Result<(), BookingError> {
        let calendar = self.context.calendar()?;
        let owner = self.owner(professional).await?;
        self.context
            .bounded(calendar.delete_event(&owner.calendar_ref, event_id))
            .await?;
        info!(professional = %owner.name, event_id, "Booking cancelled");
        Ok(())
    }

    /// Applies `update`. A move is held and checked against the professional's other events
    /// the same way a new booking is.
    pub async fn update(
        &self,
        professional: &str,
        event_id: &str,
        update: &BookingUpdate,
    ) -> Result<(), BookingError> {
        let calendar = self.context.calendar()?;
        let owner = self.owner(professional).await?;
        let interval = self.requested_interval(update)?;
        let title = update
            .title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        let patch = EventPatch {
            interval,
            title,
            description: None,
        };
        if patch.is_empty() {
            return Err(BookingError::validation("body", "nothing to change"));
        }

        let Some(interval) = interval else {
            self.context
                .bounded(calendar.update_event(&owner.calendar_ref, event_id, patch))
                .await?;
            info!(professional = %owner.name, event_id, "Booking renamed");
            return Ok(());
        };

        let hold = self
            .context
            .reservations
            .try_hold(&owner.calendar_ref, interval)
            .await?
            .ok_or(BookingError::Conflict)?;
        let result = self
            .move_event(&owner, event_id, interval, patch)
            .await;
        if let Err(e) = self.context.reservations.release(&hold).await {
            warn!(hold = %hold, error = %e, "Releasing hold failed");
        }
        result
    }

    async fn move_event(
        &self,
        owner: &Professional,
        event_id: &str,
        interval: TimeInterval,
        patch: EventPatch,
    ) -> Result<(), BookingError> {
        let calendar = self.context.calendar()?;
        let events = self
            .context
            .bounded(calendar.list_events(&owner.calendar_ref, interval.start(), interval.end()))
            .await?;
        let others: Vec<TimeInterval> = events
            .iter()
            .filter(|entry| entry.event_id != event_id)
            .filter_map(|entry| TimeInterval::new(entry.start, entry.end).ok())
            .collect();
        if overlaps_any(&interval, &others) {
            return Err(BookingError::Conflict);
        }

        self.context
            .bounded(calendar.update_event(&owner.calendar_ref, event_id, patch))
            .await?;
        info!(
            professional = %owner.name,
            event_id,
            start = %interval.start(),
            end = %interval.end(),
            "Booking moved"
        );
        Ok(())
    }

    fn requested_interval(&self, update: &BookingUpdate) -> Result<Option<TimeInterval>, BookingError> {
        let settings = &self.context.settings;
        match (&update.date, &update.time, update.duration_minutes) {
            (None, None, None) => Ok(None),
            (Some(date), Some(time), Some(minutes)) => {
                let date = validation::parse_date(date)?;
                let time = validation::parse_time(time)?;
                validation::check_duration(minutes, settings.max_duration_minutes)?;
                let start: DateTime<Utc> = settings
                    .local_instant(date, time)
                    .ok_or_else(|| BookingError::validation("time", "does not exist on that date"))?;
                TimeInterval::starting_at(start, Duration::minutes(minutes))
                    .map(Some)
                    .map_err(|e| BookingError::validation("duration_minutes", e.to_string()))
            }
            _ => Err(BookingError::validation(
                "date",
                "date, time and duration_minutes must be given together",
            )),
        }
    }

    /// Directory professionals plus the default calendar, one entry per calendar.
    async fn calendars(&self) -> Result<Vec<Professional>, BookingError> {
        let mut owners = self.context.directory.list_professionals().await?;
        if let Ok(default) = eligibility::default_professional(&self.context.settings) {
            owners.push(default);
        }
        let mut seen = HashSet::new();
        owners.retain(|p| seen.insert(p.calendar_ref.clone()));
        Ok(owners)
    }

    async fn owner(&self, name: &str) -> Result<Professional, BookingError> {
        let name = name.trim();
        if let Some(found) = self.context.directory.find_professional(name).await? {
            return Ok(found);
        }
        let settings = &self.context.settings;
        if name.eq_ignore_ascii_case(settings.default_professional_name.trim()) {
            return eligibility::default_professional(settings);
        }
        Err(BookingError::Eligibility(
            EligibilityReason::ProfessionalNotFound(name.to_string()),
        ))
    }
}
