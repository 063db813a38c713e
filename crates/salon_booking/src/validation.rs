//! Request field checks. Everything here runs before any external call.

use chrono::{NaiveDate, NaiveTime};

use crate::error::BookingError;

/// `YYYY-MM-DD`
pub fn parse_date(raw: &str) -> Result<NaiveDate, BookingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BookingError::validation("date", "is required"));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| BookingError::validation("date", "expected YYYY-MM-DD"))
}

/// `HH:MM`, 24-hour clock.
pub fn parse_time(raw: &str) -> Result<NaiveTime, BookingError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(BookingError::validation("time", "is required"));
    }
    NaiveTime::parse_from_str(raw, "%H:%M")
        .map_err(|_| BookingError::validation("time", "expected HH:MM"))
}

pub fn check_duration(minutes: i64, max_minutes: i64) -> Result<(), BookingError> {
    if minutes <= 0 {
        return Err(BookingError::validation("duration_minutes", "must be positive"));
    }
    if minutes > max_minutes {
        return Err(BookingError::validation(
            "duration_minutes",
            format!("must not exceed {}", max_minutes),
        ));
    }
    Ok(())
}

pub fn check_name(name: &str) -> Result<(), BookingError> {
    if name.trim().is_empty() {
        return Err(BookingError::validation("name", "is required"));
    }
    Ok(())
}

/// At least one of email or phone, ignoring blanks. A given email needs an `@`.
pub fn check_contact(email: Option<&str>, phone: Option<&str>) -> Result<(), BookingError> {
    let email = email.map(str::trim).filter(|e| !e.is_empty());
    let phone = phone.map(str::trim).filter(|p| !p.is_empty());
    match (email, phone) {
        (None, None) => Err(BookingError::validation(
            "contact",
            "an email address or phone number is required",
        )),
        (Some(email), _) if !email.contains('@') => {
            Err(BookingError::validation("email", "is not an email address"))
        }
        _ => Ok(()),
    }
}
