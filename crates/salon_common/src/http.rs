// --- File: crates/salon_common/src/http.rs ---
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::{HttpStatusCode, ServiceError};

pub mod client;

/// Renders an error as `{"error": {"kind", "message", "code"}}` with the matching status.
pub trait IntoHttpResponse {
    fn into_http_response(self) -> Response;
}

impl<E: HttpStatusCode> IntoHttpResponse for E {
    fn into_http_response(self) -> Response {
        json_error(self.status_code(), self.kind(), &self.user_message())
    }
}

/// Builds the JSON error body shared by every handler.
pub fn json_error(code: u16, kind: &str, message: &str) -> Response {
    let status_code = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = Json(json!({
        "error": {
            "kind": kind,
            "message": message,
            "code": status_code.as_u16(),
        }
    }));
    (status_code, body).into_response()
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_status() {
        let response = ServiceError::NotFoundError("event".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_unknown_code_falls_back_to_500() {
        let response = json_error(1000, "internal", "odd");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
