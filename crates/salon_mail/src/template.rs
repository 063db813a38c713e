//! Booking confirmation email.
//!
//! Only plain data goes in; every interpolated value is HTML-escaped.

use salon_common::EmailMessage;
use salon_config::BusinessConfig;

/// Everything a confirmation mentions.
#[derive(Debug, Clone)]
pub struct ConfirmationDetails {
    pub customer_name: String,
    pub service: String,
    pub professional: String,
    /// Already formatted for the reader, e.g. "Tuesday, 4 March 2031".
    pub date: String,
    pub time: String,
}

pub fn confirmation_email(
    to: &str,
    details: &ConfirmationDetails,
    business: &BusinessConfig,
) -> EmailMessage {
    let business_name = if business.name.trim().is_empty() {
        "the salon"
    } else {
        business.name.as_str()
    };

    let mut contact_lines = String::new();
    for (label, value) in [
        ("Phone", &business.phone),
        ("Email", &business.email),
        ("Address", &business.address),
    ] {
        if let Some(value) = value.as_deref().filter(|v| !v.trim().is_empty()) {
            contact_lines.push_str(&format!(
                "<li>{}: {}</li>",
                label,
                escape_html(value)
            ));
        }
    }

    let html = format!(
        "<h2>Booking confirmed</h2>\
         <p>Hi {customer},</p>\
         <p>your appointment at {business} is booked.</p>\
         <ul>\
         <li>Service: {service}</li>\
         <li>With: {professional}</li>\
         <li>Date: {date}</li>\
         <li>Time: {time}</li>\
         </ul>\
         <p>Questions or changes? Get in touch:</p>\
         <ul>{contact}</ul>",
        customer = escape_html(&details.customer_name),
        business = escape_html(business_name),
        service = escape_html(&details.service),
        professional = escape_html(&details.professional),
        date = escape_html(&details.date),
        time = escape_html(&details.time),
        contact = contact_lines,
    );

    EmailMessage {
        to: to.to_string(),
        subject: format!("Your appointment at {} on {}", business_name, details.date),
        html,
    }
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
