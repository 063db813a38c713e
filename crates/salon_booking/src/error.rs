// --- File: crates/salon_booking/src/error.rs ---
use axum::response::{IntoResponse, Response};
use salon_common::{HttpStatusCode, IntoHttpResponse, ServiceError};
use std::fmt;
use thiserror::Error;

/// Why no candidate professional could be produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EligibilityReason {
    ProfessionalNotFound(String),
    ServiceNotOffered { professional: String, service: String },
    NoProfessionals,
}

impl fmt::Display for EligibilityReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EligibilityReason::ProfessionalNotFound(name) => {
                write!(f, "professional '{}' not found", name)
            }
            EligibilityReason::ServiceNotOffered {
                professional,
                service,
            } => write!(f, "'{}' does not offer '{}'", professional, service),
            EligibilityReason::NoProfessionals => write!(f, "no professionals configured"),
        }
    }
}

/// Everything the engine can reject a request with.
///
/// `Display` carries diagnostic detail for the logs; clients only ever see
/// [`HttpStatusCode::user_message`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BookingError {
    #[error("configuration: {0}")]
    Configuration(String),

    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    #[error("not eligible: {0}")]
    Eligibility(EligibilityReason),

    #[error("no professional free for the requested time")]
    Conflict,

    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("booking not found: {0}")]
    BookingNotFound(String),
}

impl BookingError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        BookingError::Validation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<ServiceError> for BookingError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::ConfigError(msg) => BookingError::Configuration(msg),
            ServiceError::NotFoundError(msg) => BookingError::BookingNotFound(msg),
            other => BookingError::Upstream(other.to_string()),
        }
    }
}

impl HttpStatusCode for BookingError {
    fn status_code(&self) -> u16 {
        match self {
            BookingError::Configuration(_) => 503,
            BookingError::Validation { .. } => 400,
            BookingError::Eligibility(EligibilityReason::ProfessionalNotFound(_)) => 404,
            BookingError::Eligibility(_) => 422,
            BookingError::Conflict => 409,
            BookingError::Upstream(_) => 502,
            BookingError::BookingNotFound(_) => 404,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            BookingError::Configuration(_) => "configuration",
            BookingError::Validation { .. } => "validation",
            BookingError::Eligibility(EligibilityReason::ProfessionalNotFound(_)) => {
                "professional_not_found"
            }
            BookingError::Eligibility(EligibilityReason::ServiceNotOffered { .. }) => {
                "service_not_offered"
            }
            BookingError::Eligibility(EligibilityReason::NoProfessionals) => "no_professionals",
            BookingError::Conflict => "conflict",
            BookingError::Upstream(_) => "upstream",
            BookingError::BookingNotFound(_) => "booking_not_found",
        }
    }

    fn user_message(&self) -> String {
        match self {
            BookingError::Configuration(_) => "Booking is currently unavailable.".to_string(),
            // field and reason come from our own validators, never from upstream
            BookingError::Validation { field, reason } => format!("Invalid {}: {}.", field, reason),
            BookingError::Eligibility(EligibilityReason::ProfessionalNotFound(_)) => {
                "The selected professional does not exist.".to_string()
            }
            BookingError::Eligibility(EligibilityReason::ServiceNotOffered { .. }) => {
                "The selected professional does not offer this service.".to_string()
            }
            BookingError::Eligibility(EligibilityReason::NoProfessionals) => {
                "No professionals are available.".to_string()
            }
            BookingError::Conflict => {
                "This time is no longer available. Please pick another time.".to_string()
            }
            BookingError::Upstream(_) => {
                "A required service is temporarily unavailable. Please try again.".to_string()
            }
            BookingError::BookingNotFound(_) => "The booking does not exist.".to_string(),
        }
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}
