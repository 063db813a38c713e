// --- File: crates/salon_common/src/error.rs ---
use std::fmt;
use thiserror::Error;

/// Error returned by every collaborator behind the traits in [`crate::services`].
///
/// Concrete adapters (database, calendar, mail) convert their own error types into this one
/// at the trait boundary so the booking engine only deals with a single type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("Failed to parse data: {0}")]
    ParseError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("External service error: {service_name} - {message}")]
    ExternalServiceError {
        service_name: String,
        message: String,
    },

    #[error("Conflict: {0}")]
    ConflictError(String),

    #[error("Not found: {0}")]
    NotFoundError(String),

    #[error("Timeout: {0}")]
    TimeoutError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Maps an error onto the HTTP status code the API answers with.
pub trait HttpStatusCode: fmt::Display {
    fn status_code(&self) -> u16;

    /// Short machine-readable tag rendered next to the message.
    fn kind(&self) -> &'static str {
        "error"
    }

    /// Text safe to show end users. Defaults to the full display string.
    fn user_message(&self) -> String {
        self.to_string()
    }
}

impl HttpStatusCode for ServiceError {
    fn status_code(&self) -> u16 {
        match self {
            ServiceError::HttpError(_) => 502,
            ServiceError::ParseError(_) => 400,
            ServiceError::ConfigError(_) => 503,
            ServiceError::DatabaseError(_) => 500,
            ServiceError::ExternalServiceError { .. } => 502,
            ServiceError::ConflictError(_) => 409,
            ServiceError::NotFoundError(_) => 404,
            ServiceError::TimeoutError(_) => 504,
            ServiceError::InternalError(_) => 500,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServiceError::HttpError(_) | ServiceError::ExternalServiceError { .. } => "upstream",
            ServiceError::ParseError(_) => "parse",
            ServiceError::ConfigError(_) => "configuration",
            ServiceError::DatabaseError(_) => "database",
            ServiceError::ConflictError(_) => "conflict",
            ServiceError::NotFoundError(_) => "not_found",
            ServiceError::TimeoutError(_) => "timeout",
            ServiceError::InternalError(_) => "internal",
        }
    }
}

impl ServiceError {
    /// Timeouts and transport failures; the booking engine treats these as "calendar unreachable".
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ServiceError::HttpError(_)
                | ServiceError::TimeoutError(_)
                | ServiceError::ExternalServiceError { .. }
        )
    }
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ServiceError::TimeoutError(err.to_string())
        } else {
            ServiceError::HttpError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::ParseError(err.to_string())
    }
}

pub fn config_error<T: fmt::Display>(message: T) -> ServiceError {
    ServiceError::ConfigError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ServiceError {
    ServiceError::NotFoundError(message.to_string())
}

pub fn external_service_error<T: fmt::Display>(service_name: &str, message: T) -> ServiceError {
    ServiceError::ExternalServiceError {
        service_name: service_name.to_string(),
        message: message.to_string(),
    }
}

pub fn internal_error<T: fmt::Display>(message: T) -> ServiceError {
    ServiceError::InternalError(message.to_string())
}
