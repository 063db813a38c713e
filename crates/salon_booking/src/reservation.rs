// --- File: crates/salon_booking/src/reservation.rs ---
//! In-process reservation ledger.
//!
//! Good for a single backend instance; deployments with several instances use the SQL
//! ledger so holds are shared.

use chrono::{DateTime, Duration, Utc};
use salon_common::{BoxFuture, HoldId, ReservationStore, ServiceError, TimeInterval};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Hold {
    calendar_ref: String,
    interval: TimeInterval,
    expires_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InMemoryReservationStore {
    holds: Mutex<HashMap<String, Hold>>,
    ttl: Duration,
}

impl InMemoryReservationStore {
    pub fn new(ttl_seconds: i64) -> Self {
        Self {
            holds: Mutex::new(HashMap::new()),
            ttl: Duration::seconds(ttl_seconds.max(1)),
        }
    }

    /// Check and insert happen under one lock.
    pub fn hold_at(
        &self,
        calendar_ref: &str,
        interval: TimeInterval,
        now: DateTime<Utc>,
    ) -> Result<Option<HoldId>, ServiceError> {
        let mut holds = self
            .holds
            .lock()
            .map_err(|_| ServiceError::InternalError("reservation ledger poisoned".to_string()))?;

        holds.retain(|_, hold| hold.expires_at > now);

        let taken = holds
            .values()
            .any(|hold| hold.calendar_ref == calendar_ref && hold.interval.overlaps(&interval));
        if taken {
            debug!(calendar_ref, start = %interval.start(), "Window already held");
            return Ok(None);
        }

        let id = Uuid::new_v4().to_string();
        holds.insert(
            id.clone(),
            Hold {
                calendar_ref: calendar_ref.to_string(),
                interval,
                expires_at: now + self.ttl,
            },
        );
        Ok(Some(HoldId(id)))
    }

    pub fn active_holds(&self) -> usize {
        let now = Utc::now();
        self.holds
            .lock()
            .map(|holds| holds.values().filter(|h| h.expires_at > now).count())
            .unwrap_or(0)
    }
}

impl Default for InMemoryReservationStore {
    fn default() -> Self {
        Self::new(120)
    }
}

impl ReservationStore for InMemoryReservationStore {
    fn try_hold(
        &self,
        calendar_ref: &str,
        interval: TimeInterval,
    ) -> BoxFuture<'_, Option<HoldId>, ServiceError> {
        let result = self.hold_at(calendar_ref, interval, Utc::now());
        Box::pin(async move { result })
    }

    fn release(&self, hold: &HoldId) -> BoxFuture<'_, (), ServiceError> {
        let result = self
            .holds
            .lock()
            .map(|mut holds| {
                holds.remove(&hold.0);
            })
            .map_err(|_| ServiceError::InternalError("reservation ledger poisoned".to_string()));
        Box::pin(async move { result })
    }
}
