// --- File: crates/salon_gcal/src/service.rs ---
//! `CalendarProvider` backed by the Google Calendar API.
//!
//! Busy intervals come from the free/busy endpoint; bookings are ordinary events whose
//! times are written in UTC.

use chrono::{DateTime, NaiveDate, Utc};
use google_calendar3::api::{
    Event, EventDateTime, FreeBusyRequest, FreeBusyRequestItem, FreeBusyResponse,
};
use salon_common::{
    BoxFuture, CalendarEntry, CalendarProvider, EventPatch, NewCalendarEvent, ServiceError,
    TimeInterval,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::HubType;
use crate::error::GcalError;

pub struct GoogleCalendarProvider {
    calendar_hub: Arc<HubType>,
}

impl GoogleCalendarProvider {
    pub fn new(calendar_hub: Arc<HubType>) -> Self {
        Self { calendar_hub }
    }

    async fn busy(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<TimeInterval>, GcalError> {
        let req = FreeBusyRequest {
            time_min: Some(from),
            time_max: Some(to),
            time_zone: Some("UTC".to_string()),
            items: Some(vec![FreeBusyRequestItem {
                id: Some(calendar_id.to_string()),
                ..Default::default()
            }]),
            ..Default::default()
        };

        let (_response, freebusy) = self.calendar_hub.freebusy().query(req).doit().await?;
        busy_periods(calendar_id, &freebusy)
    }

    async fn insert(&self, calendar_id: &str, event: NewCalendarEvent) -> Result<String, GcalError> {
        let new_event = Event {
            summary: Some(event.title),
            description: Some(event.description),
            start: Some(utc_time(event.interval.start())),
            end: Some(utc_time(event.interval.end())),
            ..Default::default()
        };

        let (_response, created) = self
            .calendar_hub
            .events()
            .insert(new_event, calendar_id)
            .doit()
            .await?;

        let event_id = created.id.unwrap_or_default();
        info!(calendar_id, event_id = %event_id, "Calendar event created");
        Ok(event_id)
    }

    async fn patch(&self, calendar_id: &str, event_id: &str, patch: EventPatch) -> Result<(), GcalError> {
        let (_response, current) = self.calendar_hub.events().get(calendar_id, event_id).doit().await?;

        let update = Event {
            summary: patch.title,
            description: patch.description,
            start: patch.interval.map(|i| utc_time(i.start())),
            end: patch.interval.map(|i| utc_time(i.end())),
            sequence: Some(current.sequence.map(|n| n + 1).unwrap_or(1)),
            ..Default::default()
        };

        self.calendar_hub
            .events()
            .patch(update, calendar_id, event_id)
            .send_updates("none")
            .doit()
            .await?;
        info!(calendar_id, event_id, "Calendar event updated");
        Ok(())
    }

    async fn delete(&self, calendar_id: &str, event_id: &str) -> Result<(), GcalError> {
        let result = self
            .calendar_hub
            .events()
            .delete(calendar_id, event_id)
            .send_updates("none")
            .doit()
            .await
            .map_err(GcalError::from);

        match result {
            Ok(_) => {
                info!(calendar_id, event_id, "Calendar event deleted");
                Ok(())
            }
            // already gone counts as deleted
            Err(e) if e.is_gone() => {
                debug!(calendar_id, event_id, "Event was already deleted");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    async fn events(
        &self,
        calendar_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<CalendarEntry>, GcalError> {
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        loop {
            let mut call = self
                .calendar_hub
                .events()
                .list(calendar_id)
                .time_min(from)
                .time_max(to)
                .single_events(true)
                .order_by("startTime")
                .show_deleted(false);
            if let Some(token) = page_token.as_deref() {
                call = call.page_token(token);
            }
            let (_, events_list) = call.doit().await?;
            push_entries(calendar_id, events_list.items.unwrap_or_default(), &mut entries);

            page_token = events_list.next_page_token.filter(|t| !t.is_empty());
            if page_token.is_none() {
                break;
            }
            debug!(calendar_id, fetched = entries.len(), "Fetching next event page");
        }
        entries.sort_by_key(|e| e.start);
        Ok(entries)
    }
}

/// Busy intervals of `calendar_id` from a free/busy answer. Google reports calendars it
/// cannot read through `errors` instead of a busy list; those are an error here, not free.
fn busy_periods(calendar_id: &str, freebusy: &FreeBusyResponse) -> Result<Vec<TimeInterval>, GcalError> {
    let info = freebusy
        .calendars
        .as_ref()
        .and_then(|calendars| calendars.get(calendar_id))
        .ok_or_else(|| GcalError::Unreadable {
            calendar_id: calendar_id.to_string(),
            reason: "missing from free/busy response".to_string(),
        })?;
    if let Some(error) = info.errors.as_ref().and_then(|errors| errors.first()) {
        return Err(GcalError::Unreadable {
            calendar_id: calendar_id.to_string(),
            reason: error.reason.clone().unwrap_or_else(|| "unknown".to_string()),
        });
    }

    let mut busy = Vec::new();
    for period in info.busy.iter().flatten() {
        match (period.start, period.end) {
            (Some(start), Some(end)) => match TimeInterval::new(start, end) {
                Ok(interval) => busy.push(interval),
                Err(e) => debug!(calendar_id, error = %e, "Skipping empty busy period"),
            },
            _ => warn!(calendar_id, "Skipping busy period with missing start/end"),
        }
    }
    busy.sort();
    Ok(busy)
}

/// Non-cancelled events with usable times.
fn push_entries(calendar_id: &str, events: Vec<Event>, entries: &mut Vec<CalendarEntry>) {
    for event in events {
        if event.status.as_deref() == Some("cancelled") {
            continue;
        }
        let event_id = event.id.clone().unwrap_or_default();
        let (Some(start), Some(end)) = (
            event.start.as_ref().and_then(event_instant),
            event.end.as_ref().and_then(event_instant),
        ) else {
            warn!(calendar_id, event_id = %event_id, "{}", GcalError::MissingTime(event_id.clone()));
            continue;
        };
        entries.push(CalendarEntry {
            event_id,
            title: event.summary.unwrap_or_default(),
            description: event.description.unwrap_or_default(),
            start,
            end,
        });
    }
}

fn utc_time(at: DateTime<Utc>) -> EventDateTime {
    EventDateTime {
        date_time: Some(at),
        time_zone: Some("UTC".to_string()),
        ..Default::default()
    }
}

/// All-day events only carry a date; they are read as starting at midnight UTC.
fn event_instant(at: &EventDateTime) -> Option<DateTime<Utc>> {
    at.date_time.or_else(|| at.date.and_then(midnight_utc))
}

fn midnight_utc(date: NaiveDate) -> Option<DateTime<Utc>> {
    date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc())
}

impl CalendarProvider for GoogleCalendarProvider {
    fn list_busy(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<TimeInterval>, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move { Ok(self.busy(&calendar_ref, from, to).await?) })
    }

    fn insert_event(
        &self,
        calendar_ref: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, String, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move { Ok(self.insert(&calendar_ref, event).await?) })
    }

    fn update_event(
        &self,
        calendar_ref: &str,
        event_id: &str,
        patch: EventPatch,
    ) -> BoxFuture<'_, (), ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move { Ok(self.patch(&calendar_ref, &event_id, patch).await?) })
    }

    fn delete_event(&self, calendar_ref: &str, event_id: &str) -> BoxFuture<'_, (), ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move { Ok(self.delete(&calendar_ref, &event_id).await?) })
    }

    fn list_events(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEntry>, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move { Ok(self.events(&calendar_ref, from, to).await?) })
    }
}
