// --- File: crates/salon_booking/src/event_format.rs ---
//! How a booking is written into a calendar event and read back.
//!
//! Title: `[<tag>] <service> - <customer>`. The tag marks salon bookings in calendars that
//! also hold unrelated entries. Description: one `Key: value` line per field.

use salon_common::CalendarEntry;
use serde::Serialize;

/// Service label used when a booking names no service.
pub const DEFAULT_SERVICE_LABEL: &str = "Appointment";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDetails {
    pub service: String,
    pub professional: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

pub fn event_title(tag: &str, service: &str, customer_name: &str) -> String {
    format!("[{}] {} - {}", tag, service.trim(), customer_name.trim())
}

pub fn event_description(details: &EventDetails) -> String {
    let mut lines = vec![
        format!("Service: {}", details.service.trim()),
        format!("Professional: {}", details.professional.trim()),
    ];
    if let Some(phone) = non_blank(details.phone.as_deref()) {
        lines.push(format!("Phone: {}", phone));
    }
    if let Some(email) = non_blank(details.email.as_deref()) {
        lines.push(format!("Email: {}", email));
    }
    lines.join("\n")
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// A salon booking recovered from a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingSummary {
    pub event_id: String,
    /// RFC 3339, UTC
    pub start: String,
    pub end: String,
    pub service: String,
    pub professional: String,
    pub customer_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

/// Reads back an event written by [`event_title`]/[`event_description`]. Events without the
/// tag are not salon bookings and yield `None`. `calendar_owner` fills in the professional
/// when the description lacks one.
pub fn parse_booking(tag: &str, calendar_owner: &str, entry: &CalendarEntry) -> Option<BookingSummary> {
    let prefix = format!("[{}]", tag);
    let rest = entry.title.trim().strip_prefix(&prefix)?.trim();
    let (title_service, customer_name) = match rest.rsplit_once(" - ") {
        Some((service, customer)) => (service.trim(), customer.trim()),
        None => (rest, ""),
    };

    let mut service = None;
    let mut professional = None;
    let mut phone = None;
    let mut email = None;
    for line in entry.description.lines() {
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match key.trim().to_ascii_lowercase().as_str() {
            "service" => service = Some(value.to_string()),
            "professional" => professional = Some(value.to_string()),
            "phone" => phone = Some(value.to_string()),
            "email" => email = Some(value.to_string()),
            _ => {}
        }
    }

    Some(BookingSummary {
        event_id: entry.event_id.clone(),
        start: entry.start.to_rfc3339(),
        end: entry.end.to_rfc3339(),
        service: service.unwrap_or_else(|| title_service.to_string()),
        professional: professional.unwrap_or_else(|| calendar_owner.to_string()),
        customer_name: customer_name.to_string(),
        phone,
        email,
    })
}
