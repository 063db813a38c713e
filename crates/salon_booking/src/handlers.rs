// --- File: crates/salon_booking/src/handlers.rs ---
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use chrono::Utc;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use crate::admin::{BookingAdmin, BookingList, BookingListQuery, BookingUpdate};
use crate::assigner::{BookingAssigner, BookingRequest};
use crate::availability::{AvailabilityQuery, AvailabilityResponse, AvailabilityService};
use crate::context::BookingContext;
use crate::error::BookingError;

/// Shared state of the booking routes.
pub struct BookingState {
    pub context: Arc<BookingContext>,
    pub availability: AvailabilityService,
    pub assigner: BookingAssigner,
    pub admin: BookingAdmin,
}

impl BookingState {
    pub fn new(context: Arc<BookingContext>) -> Self {
        Self {
            availability: AvailabilityService::new(context.clone()),
            assigner: BookingAssigner::new(context.clone()),
            admin: BookingAdmin::new(context.clone()),
            context,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct BookingConfirmation {
    pub success: bool,
    pub event_id: String,
    pub professional: String,
    /// Local date and time as requested
    pub date: String,
    pub time: String,
    /// RFC 3339, UTC
    pub start: String,
    pub end: String,
    /// Follow-up steps that failed; the booking itself stands.
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProfessionalView {
    pub name: String,
    pub services: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct StatusResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct HealthResponse {
    pub status: String,
    pub calendar: bool,
    pub mail: bool,
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/availability",
    params(AvailabilityQuery),
    responses(
        (status = 200, description = "Start times and free professionals", body = AvailabilityResponse),
        (status = 400, description = "Invalid date or duration"),
        (status = 404, description = "Unknown professional"),
        (status = 422, description = "Professional does not offer the service")
    ),
    tag = "Booking"
))]
pub async fn get_availability_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, BookingError> {
    let response = state.availability.slots(&query, Utc::now()).await?;
    Ok(Json(response))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    post,
    path = "/book",
    request_body(content = BookingRequest, example = json!({
        "date": "2031-03-04",
        "time": "10:30",
        "duration_minutes": 45,
        "service": "Cut",
        "customer": {"name": "Jane Doe", "email": "jane@example.com", "phone": null}
    })),
    responses(
        (status = 201, description = "Booked", body = BookingConfirmation),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "No professional free at that time"),
        (status = 502, description = "Calendar unavailable")
    ),
    tag = "Booking"
))]
pub async fn book_handler(
    State(state): State<Arc<BookingState>>,
    Json(request): Json<BookingRequest>,
) -> Result<(StatusCode, Json<BookingConfirmation>), BookingError> {
    let assignment = state.assigner.assign(&request).await?;
    info!(
        event_id = %assignment.event_id,
        professional = %assignment.professional.name,
        "Booking confirmed"
    );
    let local_start = assignment
        .interval
        .start()
        .with_timezone(&state.context.settings.time_zone);
    Ok((
        StatusCode::CREATED,
        Json(BookingConfirmation {
            success: true,
            event_id: assignment.event_id,
            professional: assignment.professional.name,
            date: local_start.format("%Y-%m-%d").to_string(),
            time: local_start.format("%H:%M").to_string(),
            start: assignment.interval.start().to_rfc3339(),
            end: assignment.interval.end().to_rfc3339(),
            warnings: assignment.warnings,
        }),
    ))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/admin/bookings",
    params(BookingListQuery),
    responses(
        (status = 200, description = "Bookings sorted by start", body = BookingList),
        (status = 400, description = "Invalid date range")
    ),
    tag = "Admin"
))]
pub async fn list_bookings_handler(
    State(state): State<Arc<BookingState>>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingList>, BookingError> {
    Ok(Json(state.admin.list_bookings(&query).await?))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    delete,
    path = "/admin/bookings/{professional}/{event_id}",
    params(
        ("professional" = String, Path, description = "Name of the professional"),
        ("event_id" = String, Path, description = "Calendar event id")
    ),
    responses(
        (status = 200, description = "Cancelled", body = StatusResponse),
        (status = 404, description = "Unknown professional or booking")
    ),
    tag = "Admin"
))]
pub async fn cancel_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path((professional, event_id)): Path<(String, String)>,
) -> Result<Json<StatusResponse>, BookingError> {
    state.admin.cancel(&professional, &event_id).await?;
    Ok(Json(StatusResponse {
        success: true,
        message: "Booking cancelled.".to_string(),
    }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    patch,
    path = "/admin/bookings/{professional}/{event_id}",
    params(
        ("professional" = String, Path, description = "Name of the professional"),
        ("event_id" = String, Path, description = "Calendar event id")
    ),
    request_body = BookingUpdate,
    responses(
        (status = 200, description = "Updated", body = StatusResponse),
        (status = 400, description = "Invalid change"),
        (status = 409, description = "New time overlaps another booking")
    ),
    tag = "Admin"
))]
pub async fn update_booking_handler(
    State(state): State<Arc<BookingState>>,
    Path((professional, event_id)): Path<(String, String)>,
    Json(update): Json<BookingUpdate>,
) -> Result<Json<StatusResponse>, BookingError> {
    state.admin.update(&professional, &event_id, &update).await?;
    Ok(Json(StatusResponse {
        success: true,
        message: "Booking updated.".to_string(),
    }))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/professionals",
    responses((status = 200, description = "Bookable professionals", body = [ProfessionalView])),
    tag = "Booking"
))]
pub async fn list_professionals_handler(
    State(state): State<Arc<BookingState>>,
) -> Result<Json<Vec<ProfessionalView>>, BookingError> {
    let professionals = state.context.directory.list_professionals().await?;
    Ok(Json(
        professionals
            .into_iter()
            .map(|p| ProfessionalView {
                name: p.name,
                services: p.services.into_iter().collect(),
            })
            .collect(),
    ))
}

#[axum::debug_handler]
#[cfg_attr(feature = "openapi", utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthResponse)),
    tag = "Booking"
))]
pub async fn health_handler(State(state): State<Arc<BookingState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        calendar: state.context.calendar.is_some(),
        mail: state.context.notifier.is_some(),
    })
}
