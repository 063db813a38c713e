// --- File: crates/salon_booking/src/eligibility.rs ---
//! Who may take a booking.
//!
//! The same resolution runs when slots are displayed and again when a booking commits; with
//! an unchanged directory both return the same candidates in the same order.

use salon_common::{DirectoryStore, Professional};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::context::BookingSettings;
use crate::error::{BookingError, EligibilityReason};

/// Optional professional/service constraint of a request. Blank strings count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EligibilityFilter {
    pub professional: Option<String>,
    pub service: Option<String>,
}

impl EligibilityFilter {
    pub fn new(professional: Option<&str>, service: Option<&str>) -> Self {
        Self {
            professional: professional.map(str::to_string),
            service: service.map(str::to_string),
        }
    }

    pub fn professional(&self) -> Option<&str> {
        non_blank(self.professional.as_deref())
    }

    pub fn service(&self) -> Option<&str> {
        non_blank(self.service.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// The professional bound to the site-wide calendar.
pub fn default_professional(settings: &BookingSettings) -> Result<Professional, BookingError> {
    let calendar = settings.default_calendar.as_ref().ok_or_else(|| {
        BookingError::Configuration("no default calendar configured".to_string())
    })?;
    Ok(Professional::new(
        settings.default_professional_name.clone(),
        calendar.clone(),
    ))
}

/// Resolves the candidate professionals for `filter`.
///
/// On success the list is never empty.
pub async fn resolve(
    directory: &dyn DirectoryStore,
    settings: &BookingSettings,
    filter: &EligibilityFilter,
) -> Result<Vec<Professional>, BookingError> {
    if let Some(name) = filter.professional() {
        let professional = directory
            .find_professional(name)
            .await
            .map_err(|e| {
                warn!(professional = name, error = %e, "Professional lookup failed");
                BookingError::from(e)
            })?
            .ok_or_else(|| {
                BookingError::Eligibility(EligibilityReason::ProfessionalNotFound(name.to_string()))
            })?;

        if let Some(service) = filter.service() {
            if !professional.offers(service) {
                return Err(BookingError::Eligibility(
                    EligibilityReason::ServiceNotOffered {
                        professional: professional.name,
                        service: service.to_string(),
                    },
                ));
            }
        }
        return Ok(vec![professional]);
    }

    if let Some(service) = filter.service() {
        let all = directory.list_professionals().await.map_err(|e| {
            warn!(service, error = %e, "Listing professionals failed");
            BookingError::from(e)
        })?;
        if all.is_empty() {
            return Err(BookingError::Eligibility(EligibilityReason::NoProfessionals));
        }

        let offering: Vec<Professional> = all.iter().filter(|p| p.offers(service)).cloned().collect();
        if !offering.is_empty() {
            return Ok(offering);
        }
        if settings.untagged_service_fallback {
            debug!(service, "No professional tagged with service, using everyone");
            return Ok(all);
        }
        return Err(BookingError::Eligibility(EligibilityReason::NoProfessionals));
    }

    Ok(vec![default_professional(settings)?])
}
