//! Half-open time intervals.
//!
//! Every overlap decision in the booking engine goes through [`TimeInterval::overlaps`]:
//! two intervals overlap iff `max(a.start, b.start) < min(a.end, b.end)`, so intervals that
//! merely touch (`a.end == b.start`) do not overlap.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("interval start {start} is not before end {end}")]
pub struct InvalidInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// `[start, end)` with `start < end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TimeInterval {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, InvalidInterval> {
        if start < end {
            Ok(Self { start, end })
        } else {
            Err(InvalidInterval { start, end })
        }
    }

    /// Interval of `duration` starting at `start`.
    pub fn starting_at(start: DateTime<Utc>, duration: Duration) -> Result<Self, InvalidInterval> {
        Self::new(start, start + duration)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn overlaps(&self, other: &TimeInterval) -> bool {
        overlaps(self.start, self.end, other.start, other.end)
    }
}

/// Strict half-open intersection test on raw bounds.
pub fn overlaps(
    a_start: DateTime<Utc>,
    a_end: DateTime<Utc>,
    b_start: DateTime<Utc>,
    b_end: DateTime<Utc>,
) -> bool {
    a_start.max(b_start) < a_end.min(b_end)
}

/// True if `window` overlaps any interval in `busy`.
pub fn overlaps_any<'a, I>(window: &TimeInterval, busy: I) -> bool
where
    I: IntoIterator<Item = &'a TimeInterval>,
{
    busy.into_iter().any(|b| window.overlaps(b))
}
