// --- File: crates/salon_booking/src/opening_hours.rs ---
//! Free-text weekly opening hours.
//!
//! Accepted text is a comma separated list of clauses `DAY[-DAY]: RANGE[, RANGE...]`,
//! e.g. `"Mon-Fri: 9AM-6PM, Sat: 10AM-2PM, 3PM-5PM"`. Days are weekday names or their
//! three-letter abbreviations, ranges are `H[AM|PM]-H[AM|PM]` (a bare hour is read on the
//! 24-hour clock). The whole text `"closed"` closes every day. Anything unrecognised is
//! skipped; parsing never fails.
//!
//! The result is a grid of 13 hourly buckets per day, bucket `i` covering `8+i:00` to
//! `9+i:00`.

use chrono::Weekday;
use once_cell::sync::Lazy;
use regex::Regex;
use salon_common::HoursSetting;
use tracing::debug;

/// Hour of day covered by bucket 0.
pub const FIRST_HOUR: u32 = 8;
/// Number of hourly buckets, 08:00 to 21:00.
pub const BUCKETS: usize = 13;

pub type DayHours = [bool; BUCKETS];

pub const ALL_OPEN: DayHours = [true; BUCKETS];
pub const ALL_CLOSED: DayHours = [false; BUCKETS];

/// Used when there is no setting at all or it cannot be read, so a missing row never
/// turns into "no slots ever".
pub const ASSUME_OPEN: DayHours = ALL_OPEN;

/// Used for a day the text does not open: 09:00 to 18:00.
pub const ASSUMED_BUSINESS_HOURS: DayHours = [
    false, true, true, true, true, true, true, true, true, true, false, false, false,
];

/// Which fallbacks [`hours_for_day`] applies. A disabled fallback closes the day instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoursPolicy {
    /// Absent or unreadable setting opens the whole grid.
    pub assume_open_when_unknown: bool,
    /// A day the text does not open gets [`ASSUMED_BUSINESS_HOURS`].
    pub assume_business_hours: bool,
}

impl Default for HoursPolicy {
    fn default() -> Self {
        Self {
            assume_open_when_unknown: true,
            assume_business_hours: true,
        }
    }
}

static TIME_RANGE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^\s*(\d{1,2})\s*(am|pm)?\s*-\s*(\d{1,2})\s*(am|pm)?\s*$")
        .expect("valid time range pattern")
});

/// Parsed weekly grid. A day that no clause mentions is `None` ("not written down").
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct OpeningHoursGrid {
    days: [Option<DayHours>; 7],
    closed: bool,
}

impl OpeningHoursGrid {
    /// Grid for the literal `"closed"`.
    pub fn closed() -> Self {
        Self {
            days: [Some(ALL_CLOSED); 7],
            closed: true,
        }
    }

    /// True only for the literal `"closed"` text.
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn day(&self, weekday: Weekday) -> Option<&DayHours> {
        self.days[weekday.num_days_from_monday() as usize].as_ref()
    }

    fn open(&mut self, weekday: Weekday, start_hour: u32, end_hour: u32) {
        let day = self.days[weekday.num_days_from_monday() as usize].get_or_insert(ALL_CLOSED);
        for (i, bucket) in day.iter_mut().enumerate() {
            let hour = FIRST_HOUR + i as u32;
            if start_hour <= hour && hour < end_hour {
                *bucket = true;
            }
        }
    }

    fn mention(&mut self, weekday: Weekday) {
        self.days[weekday.num_days_from_monday() as usize].get_or_insert(ALL_CLOSED);
    }
}

/// Parses the weekly opening-hours text.
pub fn parse(text: &str) -> OpeningHoursGrid {
    if text.trim().eq_ignore_ascii_case("closed") {
        return OpeningHoursGrid::closed();
    }

    let mut grid = OpeningHoursGrid::default();
    // days of the clause the next bare range belongs to
    let mut current: Option<Vec<Weekday>> = None;

    for piece in text.split(',') {
        let range_text = match piece.split_once(':') {
            Some((days_text, range_text)) => {
                current = parse_days(days_text);
                if current.is_none() {
                    debug!(clause = piece.trim(), "Skipping clause with unknown days");
                    continue;
                }
                range_text
            }
            None => piece,
        };

        let Some(days) = current.as_ref() else {
            debug!(clause = piece.trim(), "Skipping range without a day clause");
            continue;
        };
        for &day in days {
            grid.mention(day);
        }
        match parse_range(range_text) {
            Some((start, end)) => {
                for &day in days {
                    grid.open(day, start, end);
                }
            }
            None => debug!(range = range_text.trim(), "Skipping unrecognised time range"),
        }
    }
    grid
}

/// `Mon`, `mon-fri`, `Saturday`. Ranges run forward through the week; a reversed range
/// like `Fri-Mon` is rejected.
fn parse_days(text: &str) -> Option<Vec<Weekday>> {
    let text = text.trim();
    match text.split_once('-') {
        Some((from, to)) => {
            let from = parse_day(from)?;
            let to = parse_day(to)?;
            let (first, last) = (from.num_days_from_monday(), to.num_days_from_monday());
            if first > last {
                return None;
            }
            let mut days = Vec::with_capacity((last - first + 1) as usize);
            let mut day = from;
            loop {
                days.push(day);
                if day == to {
                    break;
                }
                day = day.succ();
            }
            Some(days)
        }
        None => parse_day(text).map(|d| vec![d]),
    }
}

fn parse_day(token: &str) -> Option<Weekday> {
    token.trim().parse::<Weekday>().ok()
}

/// `9AM-6PM` → `(9, 18)`. 12 AM is hour 0, 12 PM is hour 12.
fn parse_range(text: &str) -> Option<(u32, u32)> {
    let caps = TIME_RANGE.captures(text)?;
    let start = to_24h(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str()))?;
    let end = to_24h(caps.get(3)?.as_str(), caps.get(4).map(|m| m.as_str()))?;
    Some((start, end))
}

fn to_24h(hour: &str, meridiem: Option<&str>) -> Option<u32> {
    let hour: u32 = hour.parse().ok()?;
    let hour = match meridiem.map(str::to_ascii_lowercase).as_deref() {
        Some(_) if hour == 0 || hour > 12 => return None,
        Some("am") => hour % 12,
        Some(_) => hour % 12 + 12,
        None if hour > 24 => return None,
        None => hour,
    };
    Some(hour)
}

/// Opening hours for one weekday, applying the fallback table:
///
/// | setting                              | result                                  |
/// |--------------------------------------|-----------------------------------------|
/// | absent, or the lookup failed         | [`ASSUME_OPEN`] if the policy allows it |
/// | literally `"closed"`                 | all closed                              |
/// | day missing or without open hours    | [`ASSUMED_BUSINESS_HOURS`] if allowed   |
/// | day with at least one open hour      | as parsed                               |
///
/// A fallback the policy disables yields all closed.
pub fn hours_for_day(setting: &HoursSetting, weekday: Weekday, policy: &HoursPolicy) -> DayHours {
    let text = match setting {
        HoursSetting::Absent | HoursSetting::Failed if policy.assume_open_when_unknown => {
            return ASSUME_OPEN
        }
        HoursSetting::Absent | HoursSetting::Failed => return ALL_CLOSED,
        HoursSetting::Present(text) => text,
    };
    let grid = parse(text);
    if grid.is_closed() {
        return ALL_CLOSED;
    }
    match grid.day(weekday) {
        Some(hours) if hours.iter().any(|open| *open) => *hours,
        _ if policy.assume_business_hours => ASSUMED_BUSINESS_HOURS,
        _ => ALL_CLOSED,
    }
}
