use salon_common::ServiceError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GcalError {
    #[error("Google API Error: {0}")]
    ApiError(#[from] google_calendar3::Error),
    #[error("Google Calendar authentication failed: {0}")]
    Auth(String),
    #[error("Event {0} has no usable start/end")]
    MissingTime(String),
    #[error("Calendar {calendar_id} could not be read: {reason}")]
    Unreadable { calendar_id: String, reason: String },
}

impl GcalError {
    /// The API reports unknown or already deleted events with a 404/410.
    pub fn is_gone(&self) -> bool {
        match self {
            GcalError::ApiError(e) => {
                let msg = e.to_string();
                msg.contains("404") || msg.contains("410")
            }
            _ => false,
        }
    }
}

impl From<GcalError> for ServiceError {
    fn from(err: GcalError) -> Self {
        match err {
            GcalError::Auth(msg) => ServiceError::ConfigError(msg),
            other if other.is_gone() => ServiceError::NotFoundError(other.to_string()),
            other => ServiceError::ExternalServiceError {
                service_name: "google_calendar".to_string(),
                message: other.to_string(),
            },
        }
    }
}
