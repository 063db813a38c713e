//! In-memory collaborators and context builders for the booking tests.
#![allow(dead_code)]

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use salon_booking::{BookingContext, BookingSettings, HoursPolicy, InMemoryReservationStore};
use salon_common::{
    BoxFuture, CalendarEntry, CalendarProvider, ContactRecord, ContactUpsert, DirectoryStore,
    EmailMessage, EventPatch, HoursSetting, NewCalendarEvent, Notifier, Professional,
    ServiceError, TimeInterval,
};
use salon_common::error::{external_service_error, not_found};
use salon_config::{BusinessConfig, BusyFetchFailure};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TZ: Tz = chrono_tz::Europe::Zurich;
pub const DEFAULT_CALENDAR: &str = "salon@calendar";

/// A Tuesday in winter time (UTC+1).
pub fn test_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2031, 3, 4).unwrap()
}

/// Local wall-clock time on [`test_date`] as UTC.
pub fn local(h: u32, m: u32) -> DateTime<Utc> {
    let time = NaiveTime::from_hms_opt(h, m, 0).unwrap();
    TZ.from_local_datetime(&test_date().and_time(time))
        .single()
        .unwrap()
        .with_timezone(&Utc)
}

pub fn window(h: u32, m: u32, minutes: i64) -> TimeInterval {
    TimeInterval::starting_at(local(h, m), chrono::Duration::minutes(minutes)).unwrap()
}

/// Calendar kept in memory, with per-calendar failure injection.
#[derive(Default)]
pub struct FakeCalendar {
    events: Mutex<HashMap<String, Vec<CalendarEntry>>>,
    failing: Mutex<HashSet<String>>,
    fail_inserts: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
    insert_delay: Mutex<Option<Duration>>,
    next_id: AtomicU64,
}

impl FakeCalendar {
    pub fn add_busy(&self, calendar_ref: &str, interval: TimeInterval) {
        self.add_event(calendar_ref, interval, "Private", "");
    }

    pub fn add_event(&self, calendar_ref: &str, interval: TimeInterval, title: &str, description: &str) -> String {
        let id = format!("evt{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.events
            .lock()
            .unwrap()
            .entry(calendar_ref.to_string())
            .or_default()
            .push(CalendarEntry {
                event_id: id.clone(),
                title: title.to_string(),
                description: description.to_string(),
                start: interval.start(),
                end: interval.end(),
            });
        id
    }

    pub fn fail(&self, calendar_ref: &str) {
        self.failing.lock().unwrap().insert(calendar_ref.to_string());
    }

    pub fn fail_inserts(&self) {
        *self.fail_inserts.lock().unwrap() = true;
    }

    /// Every read sleeps this long first.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Every insert sleeps this long first.
    pub fn set_insert_delay(&self, delay: Duration) {
        *self.insert_delay.lock().unwrap() = Some(delay);
    }

    pub fn events(&self, calendar_ref: &str) -> Vec<CalendarEntry> {
        self.events
            .lock()
            .unwrap()
            .get(calendar_ref)
            .cloned()
            .unwrap_or_default()
    }

    fn check(&self, calendar_ref: &str) -> Result<(), ServiceError> {
        if self.failing.lock().unwrap().contains(calendar_ref) {
            return Err(external_service_error("fake_calendar", "backendError"));
        }
        Ok(())
    }

    fn in_range(&self, calendar_ref: &str, from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<CalendarEntry> {
        let mut entries: Vec<CalendarEntry> = self
            .events(calendar_ref)
            .into_iter()
            .filter(|e| e.start < to && from < e.end)
            .collect();
        entries.sort_by_key(|e| e.start);
        entries
    }

    async fn pause(&self) {
        let delay = *self.delay.lock().unwrap();
        match delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => tokio::task::yield_now().await,
        }
    }
}

impl CalendarProvider for FakeCalendar {
    fn list_busy(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<TimeInterval>, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            self.pause().await;
            self.check(&calendar_ref)?;
            Ok(self
                .in_range(&calendar_ref, from, to)
                .into_iter()
                .filter_map(|e| TimeInterval::new(e.start, e.end).ok())
                .collect())
        })
    }

    fn insert_event(
        &self,
        calendar_ref: &str,
        event: NewCalendarEvent,
    ) -> BoxFuture<'_, String, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            let delay = *self.insert_delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.check(&calendar_ref)?;
            if *self.fail_inserts.lock().unwrap() {
                return Err(external_service_error("fake_calendar", "insert refused"));
            }
            Ok(self.add_event(&calendar_ref, event.interval, &event.title, &event.description))
        })
    }

    fn update_event(
        &self,
        calendar_ref: &str,
        event_id: &str,
        patch: EventPatch,
    ) -> BoxFuture<'_, (), ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.check(&calendar_ref)?;
            let mut events = self.events.lock().unwrap();
            let entry = events
                .get_mut(&calendar_ref)
                .and_then(|list| list.iter_mut().find(|e| e.event_id == event_id))
                .ok_or_else(|| not_found(&event_id))?;
            if let Some(interval) = patch.interval {
                entry.start = interval.start();
                entry.end = interval.end();
            }
            if let Some(title) = patch.title {
                entry.title = title;
            }
            if let Some(description) = patch.description {
                entry.description = description;
            }
            Ok(())
        })
    }

    fn delete_event(&self, calendar_ref: &str, event_id: &str) -> BoxFuture<'_, (), ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        let event_id = event_id.to_string();
        Box::pin(async move {
            self.check(&calendar_ref)?;
            let mut events = self.events.lock().unwrap();
            let list = events.entry(calendar_ref).or_default();
            let before = list.len();
            list.retain(|e| e.event_id != event_id);
            if list.len() == before {
                return Err(not_found(&event_id));
            }
            Ok(())
        })
    }

    fn list_events(
        &self,
        calendar_ref: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> BoxFuture<'_, Vec<CalendarEntry>, ServiceError> {
        let calendar_ref = calendar_ref.to_string();
        Box::pin(async move {
            self.pause().await;
            self.check(&calendar_ref)?;
            Ok(self.in_range(&calendar_ref, from, to))
        })
    }
}

pub struct FakeDirectory {
    pub professionals: Vec<Professional>,
    pub hours: Result<HoursSetting, ServiceError>,
    pub contacts: Mutex<Vec<ContactRecord>>,
    pub contact_failures: Mutex<u32>,
}

impl FakeDirectory {
    pub fn new(professionals: Vec<Professional>) -> Self {
        Self {
            professionals,
            hours: Ok(HoursSetting::Absent),
            contacts: Mutex::new(Vec::new()),
            contact_failures: Mutex::new(0),
        }
    }

    pub fn with_hours(mut self, text: &str) -> Self {
        self.hours = Ok(HoursSetting::Present(text.to_string()));
        self
    }

    pub fn with_failing_hours(mut self) -> Self {
        self.hours = Err(ServiceError::DatabaseError("settings unreadable".into()));
        self
    }

    /// The next `n` upserts fail.
    pub fn fail_contacts(&self, n: u32) {
        *self.contact_failures.lock().unwrap() = n;
    }

    pub fn contacts(&self) -> Vec<ContactRecord> {
        self.contacts.lock().unwrap().clone()
    }
}

impl DirectoryStore for FakeDirectory {
    fn list_professionals(&self) -> BoxFuture<'_, Vec<Professional>, ServiceError> {
        let all = self.professionals.clone();
        Box::pin(async move { Ok(all) })
    }

    fn find_professional(&self, name: &str) -> BoxFuture<'_, Option<Professional>, ServiceError> {
        let found = self
            .professionals
            .iter()
            .find(|p| p.name == name.trim())
            .cloned();
        Box::pin(async move { Ok(found) })
    }

    fn opening_hours(&self) -> BoxFuture<'_, HoursSetting, ServiceError> {
        let hours = self.hours.clone();
        Box::pin(async move { hours })
    }

    fn upsert_contact(&self, contact: ContactRecord) -> BoxFuture<'_, ContactUpsert, ServiceError> {
        Box::pin(async move {
            {
                let mut failures = self.contact_failures.lock().unwrap();
                if *failures > 0 {
                    *failures -= 1;
                    return Err(ServiceError::DatabaseError("locked".into()));
                }
            }
            let mut contacts = self.contacts.lock().unwrap();
            contacts.push(contact);
            Ok(ContactUpsert {
                id: contacts.len() as i64,
                created: true,
            })
        })
    }
}

#[derive(Default)]
pub struct FakeNotifier {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub failing: Mutex<bool>,
    pub hanging: Mutex<bool>,
}

impl FakeNotifier {
    pub fn fail(&self) {
        *self.failing.lock().unwrap() = true;
    }

    /// Sends never answer.
    pub fn hang(&self) {
        *self.hanging.lock().unwrap() = true;
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for FakeNotifier {
    fn send(&self, message: EmailMessage) -> BoxFuture<'_, (), ServiceError> {
        Box::pin(async move {
            let hanging = *self.hanging.lock().unwrap();
            if hanging {
                std::future::pending::<()>().await;
            }
            if *self.failing.lock().unwrap() {
                return Err(external_service_error("fake_mail", "rejected"));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        })
    }
}

pub fn settings() -> BookingSettings {
    BookingSettings {
        time_zone: TZ,
        event_tag: "Salon".to_string(),
        default_professional_name: "Salon".to_string(),
        default_calendar: Some(DEFAULT_CALENDAR.to_string()),
        min_notice_minutes: 0,
        upstream_timeout: Duration::from_secs(2),
        busy_fetch_failure: BusyFetchFailure::Busy,
        untagged_service_fallback: true,
        hours_policy: HoursPolicy::default(),
        shuffle_seed: Some(7),
        side_effect_attempts: 2,
        max_duration_minutes: 480,
        owner_email: None,
        business: BusinessConfig {
            name: "Studio Test".to_string(),
            ..Default::default()
        },
    }
}

pub fn anna() -> Professional {
    Professional::new("Anna", "anna@cal").with_services(["Cut", "Color"])
}

pub fn ben() -> Professional {
    Professional::new("Ben", "ben@cal").with_services(["Cut", "Beard"])
}

/// Collaborators of a test context, kept for assertions.
pub struct Harness {
    pub calendar: Arc<FakeCalendar>,
    pub directory: Arc<FakeDirectory>,
    pub notifier: Arc<FakeNotifier>,
    pub reservations: Arc<InMemoryReservationStore>,
    pub context: Arc<BookingContext>,
}

pub fn harness(directory: FakeDirectory) -> Harness {
    harness_with(directory, settings())
}

pub fn harness_with(directory: FakeDirectory, settings: BookingSettings) -> Harness {
    let calendar = Arc::new(FakeCalendar::default());
    let directory = Arc::new(directory);
    let notifier = Arc::new(FakeNotifier::default());
    let reservations = Arc::new(InMemoryReservationStore::new(120));
    let context = Arc::new(BookingContext {
        settings,
        calendar: Some(calendar.clone() as Arc<dyn CalendarProvider>),
        directory: directory.clone(),
        reservations: reservations.clone(),
        notifier: Some(notifier.clone() as Arc<dyn Notifier>),
    });
    Harness {
        calendar,
        directory,
        notifier,
        reservations,
        context,
    }
}
