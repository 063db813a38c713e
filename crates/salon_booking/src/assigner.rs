// --- File: crates/salon_booking/src/assigner.rs ---
//! Commit-time assignment of a professional to a requested window.
//!
//! `Requested → Resolving → Verifying → Assigned | Rejected`
//!
//! Candidates are tried in shuffled order. Each one is first claimed in the reservation
//! ledger, then its live calendar is checked for exactly the requested window; the first
//! free candidate wins and keeps its hold until the calendar event exists. A concurrent
//! booking for an overlapping window therefore either fails to take the hold or, if it took
//! it first, makes this one skip the candidate.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use futures::future::join_all;
use salon_common::{
    overlaps_any, ContactRecord, EmailMessage, HoldId, NewCalendarEvent, Professional,
    ServiceError, TimeInterval,
};
use salon_mail::{confirmation_email, ConfirmationDetails};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn};

use crate::context::BookingContext;
use crate::eligibility::{self, EligibilityFilter};
use crate::error::BookingError;
use crate::event_format::{event_description, event_title, EventDetails, DEFAULT_SERVICE_LABEL};
use crate::validation;

const RETRY_BACKOFF_MS: u64 = 100;

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Customer {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingRequest {
    /// YYYY-MM-DD, business time zone
    #[cfg_attr(feature = "openapi", schema(example = "2031-03-04"))]
    pub date: String,
    /// HH:MM, business time zone
    #[cfg_attr(feature = "openapi", schema(example = "10:30"))]
    pub time: String,
    pub duration_minutes: i64,
    pub professional: Option<String>,
    pub service: Option<String>,
    pub customer: Customer,
}

/// A committed booking.
#[derive(Debug, Clone)]
pub struct Assignment {
    pub professional: Professional,
    pub interval: TimeInterval,
    pub event_id: String,
    /// Side effects that did not go through. The booking stands regardless.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentState {
    Requested,
    Resolving,
    Verifying,
    Assigned,
    Rejected,
}

impl fmt::Display for AssignmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssignmentState::Requested => "requested",
            AssignmentState::Resolving => "resolving",
            AssignmentState::Verifying => "verifying",
            AssignmentState::Assigned => "assigned",
            AssignmentState::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Tracks and logs the state of one booking attempt.
struct Attempt {
    id: String,
    state: AssignmentState,
}

impl Attempt {
    fn new() -> Self {
        let attempt = Self {
            id: uuid::Uuid::new_v4().to_string(),
            state: AssignmentState::Requested,
        };
        debug!(attempt = %attempt.id, state = %attempt.state, "Booking attempt");
        attempt
    }

    fn enter(&mut self, next: AssignmentState) {
        debug!(attempt = %self.id, from = %self.state, to = %next, "Booking state change");
        self.state = next;
    }

    fn reject(&mut self, err: BookingError) -> BookingError {
        self.enter(AssignmentState::Rejected);
        info!(attempt = %self.id, reason = %err, "Booking rejected");
        err
    }
}

pub struct BookingAssigner {
    context: Arc<BookingContext>,
    rng: Mutex<StdRng>,
}

impl BookingAssigner {
    pub fn new(context: Arc<BookingContext>) -> Self {
        let rng = match context.settings.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self {
            context,
            rng: Mutex::new(rng),
        }
    }

    /// Books `request` with the current time as reference for the minimum notice.
    pub async fn assign(&self, request: &BookingRequest) -> Result<Assignment, BookingError> {
        self.assign_at(request, Utc::now()).await
    }

    pub async fn assign_at(
        &self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<Assignment, BookingError> {
        let mut attempt = Attempt::new();
        let interval = match self.validate(request, now) {
            Ok(interval) => interval,
            Err(e) => return Err(attempt.reject(e)),
        };
        let calendar = match self.context.calendar() {
            Ok(calendar) => calendar.clone(),
            Err(e) => return Err(attempt.reject(e)),
        };

        attempt.enter(AssignmentState::Resolving);
        let filter = EligibilityFilter::new(request.professional.as_deref(), request.service.as_deref());
        let mut candidates = match eligibility::resolve(
            self.context.directory.as_ref(),
            &self.context.settings,
            &filter,
        )
        .await
        {
            Ok(candidates) => candidates,
            Err(e) => return Err(attempt.reject(e)),
        };
        self.shuffle(&mut candidates);

        attempt.enter(AssignmentState::Verifying);
        let Some((professional, hold)) = self.first_free(&candidates, &interval).await else {
            return Err(attempt.reject(BookingError::Conflict));
        };

        let service = request
            .service
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVICE_LABEL)
            .to_string();
        let details = EventDetails {
            service: service.clone(),
            professional: professional.name.clone(),
            customer_name: request.customer.name.trim().to_string(),
            phone: request.customer.phone.clone(),
            email: request.customer.email.clone(),
        };
        let event = NewCalendarEvent {
            interval,
            title: event_title(&self.context.settings.event_tag, &service, &details.customer_name),
            description: event_description(&details),
        };

        let inserted = self
            .context
            .bounded(calendar.insert_event(&professional.calendar_ref, event))
            .await;
        match &inserted {
            // the event may still land upstream; the hold covers it until its TTL runs out
            Err(ServiceError::TimeoutError(_)) => {
                warn!(attempt = %attempt.id, hold = %hold, "Calendar insert timed out, keeping hold")
            }
            _ => self.release(&hold).await,
        }
        let event_id = match inserted {
            Ok(event_id) => event_id,
            Err(e) => {
                error!(
                    attempt = %attempt.id,
                    professional = %professional.name,
                    calendar_ref = %professional.calendar_ref,
                    start = %interval.start(),
                    end = %interval.end(),
                    error = %e,
                    "Calendar insert failed"
                );
                return Err(attempt.reject(BookingError::Upstream(e.to_string())));
            }
        };

        attempt.enter(AssignmentState::Assigned);
        info!(
            attempt = %attempt.id,
            professional = %professional.name,
            event_id = %event_id,
            start = %interval.start(),
            "Booking assigned"
        );

        let warnings = self.side_effects(request, &professional, &service, &interval).await;
        Ok(Assignment {
            professional,
            interval,
            event_id,
            warnings,
        })
    }

    fn validate(
        &self,
        request: &BookingRequest,
        now: DateTime<Utc>,
    ) -> Result<TimeInterval, BookingError> {
        let settings = &self.context.settings;
        let date = validation::parse_date(&request.date)?;
        let time = validation::parse_time(&request.time)?;
        validation::check_duration(request.duration_minutes, settings.max_duration_minutes)?;
        validation::check_name(&request.customer.name)?;
        validation::check_contact(
            request.customer.email.as_deref(),
            request.customer.phone.as_deref(),
        )?;

        let start = settings
            .local_instant(date, time)
            .ok_or_else(|| BookingError::validation("time", "does not exist on that date"))?;
        if start < now + Duration::minutes(settings.min_notice_minutes) {
            return Err(BookingError::validation("time", "is too soon or in the past"));
        }
        TimeInterval::starting_at(start, Duration::minutes(request.duration_minutes))
            .map_err(|e| BookingError::validation("duration_minutes", e.to_string()))
    }

    fn shuffle(&self, candidates: &mut [Professional]) {
        match self.rng.lock() {
            Ok(mut rng) => candidates.shuffle(&mut *rng),
            Err(poisoned) => candidates.shuffle(&mut *poisoned.into_inner()),
        }
    }

    /// Holds and live-checks candidates in order; returns the first free one with its hold.
    async fn first_free(
        &self,
        candidates: &[Professional],
        interval: &TimeInterval,
    ) -> Option<(Professional, HoldId)> {
        let calendar = self.context.calendar.as_ref()?;
        for candidate in candidates {
            let hold = match self
                .context
                .reservations
                .try_hold(&candidate.calendar_ref, *interval)
                .await
            {
                Ok(Some(hold)) => hold,
                Ok(None) => {
                    debug!(professional = %candidate.name, "Window held by another booking");
                    continue;
                }
                Err(e) => {
                    warn!(professional = %candidate.name, error = %e, "Reservation ledger unavailable");
                    continue;
                }
            };

            let busy = self
                .context
                .bounded(calendar.list_busy(&candidate.calendar_ref, interval.start(), interval.end()))
                .await;
            match busy {
                Ok(busy) if !overlaps_any(interval, &busy) => return Some((candidate.clone(), hold)),
                Ok(_) => debug!(professional = %candidate.name, "Busy at the requested time"),
                // an unreadable calendar cannot take the booking either
                Err(e) => warn!(
                    professional = %candidate.name,
                    calendar_ref = %candidate.calendar_ref,
                    start = %interval.start(),
                    end = %interval.end(),
                    error = %e,
                    "Live busy check failed"
                ),
            }
            self.release(&hold).await;
        }
        None
    }

    async fn release(&self, hold: &HoldId) {
        if let Err(e) = self.context.reservations.release(hold).await {
            // the hold expires on its own
            warn!(hold = %hold, error = %e, "Releasing hold failed");
        }
    }

    /// Contact upsert and confirmation mails, run on their own task so a dropped request
    /// does not cancel them. The booking waits only for the first attempt of each, which
    /// `bounded` caps at one upstream timeout. Whatever failed is reported as a warning and
    /// retried on the task after the response has gone out.
    async fn side_effects(
        &self,
        request: &BookingRequest,
        professional: &Professional,
        service: &str,
        interval: &TimeInterval,
    ) -> Vec<String> {
        let context = self.context.clone();
        let effects = self.plan_side_effects(request, professional, service, interval);
        let (report, first_round) = oneshot::channel();

        tokio::spawn(async move {
            let results = join_all(effects.iter().map(|effect| effect.run(&context))).await;
            let mut failed = Vec::new();
            for (effect, result) in effects.into_iter().zip(results) {
                if let Err(e) = result {
                    warn!(side_effect = effect.warning(), error = %e, "Side effect failed");
                    failed.push(effect);
                }
            }
            // nobody listens if the request was dropped
            let _ = report.send(failed.iter().map(|e| e.warning().to_string()).collect());

            let remaining = context.settings.side_effect_attempts.saturating_sub(1);
            for effect in failed {
                if remaining == 0 {
                    error!(side_effect = effect.warning(), "Side effect abandoned");
                    continue;
                }
                tokio::time::sleep(backoff(1)).await;
                match retry(remaining, || effect.run(&context)).await {
                    Ok(()) => info!(side_effect = effect.warning(), "Side effect completed on retry"),
                    Err(e) => {
                        error!(side_effect = effect.warning(), error = %e, "Side effect abandoned")
                    }
                }
            }
        });

        match first_round.await {
            Ok(warnings) => warnings,
            Err(_) => {
                error!("Side effect task failed");
                vec!["side_effects_failed".to_string()]
            }
        }
    }

    fn plan_side_effects(
        &self,
        request: &BookingRequest,
        professional: &Professional,
        service: &str,
        interval: &TimeInterval,
    ) -> Vec<SideEffect> {
        let settings = &self.context.settings;
        let customer = &request.customer;
        let mut effects = vec![SideEffect::SaveContact(ContactRecord {
            name: customer.name.trim().to_string(),
            email: customer.email.clone(),
            phone: customer.phone.clone(),
        })];

        if self.context.notifier.is_none() {
            debug!("Mail disabled, no confirmation sent");
            return effects;
        }
        let local_start = interval.start().with_timezone(&settings.time_zone);
        let details = ConfirmationDetails {
            customer_name: customer.name.trim().to_string(),
            service: service.to_string(),
            professional: professional.name.clone(),
            date: local_start.format("%A, %-d %B %Y").to_string(),
            time: local_start.format("%H:%M").to_string(),
        };
        let customer_email = customer
            .email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
            .map(|e| (e.to_string(), "confirmation_not_sent"));
        let owner_email = settings
            .owner_email
            .clone()
            .map(|e| (e, "owner_copy_not_sent"));
        for (to, warning) in customer_email.into_iter().chain(owner_email) {
            effects.push(SideEffect::Mail {
                message: confirmation_email(&to, &details, &settings.business),
                warning,
            });
        }
        effects
    }
}

/// Follow-up work for a committed booking.
enum SideEffect {
    SaveContact(ContactRecord),
    Mail {
        message: EmailMessage,
        warning: &'static str,
    },
}

impl SideEffect {
    /// Warning reported when the first attempt fails.
    fn warning(&self) -> &'static str {
        match self {
            SideEffect::SaveContact(_) => "contact_not_saved",
            SideEffect::Mail { warning, .. } => *warning,
        }
    }

    async fn run(&self, context: &BookingContext) -> Result<(), ServiceError> {
        match self {
            SideEffect::SaveContact(contact) => context
                .bounded(context.directory.upsert_contact(contact.clone()))
                .await
                .map(|_| ()),
            SideEffect::Mail { message, .. } => match &context.notifier {
                Some(notifier) => context.bounded(notifier.send(message.clone())).await,
                None => Ok(()),
            },
        }
    }
}

fn backoff(attempt: u32) -> std::time::Duration {
    std::time::Duration::from_millis(RETRY_BACKOFF_MS * u64::from(attempt))
}

/// Runs `op` up to `attempts` times with a linear backoff.
async fn retry<T, F, Fut>(attempts: u32, mut op: F) -> Result<T, ServiceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ServiceError>>,
{
    let mut attempt = 1;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                debug!(attempt, error = %e, "Retrying side effect");
                tokio::time::sleep(backoff(attempt)).await;
                attempt += 1;
            }
        }
    }
}
