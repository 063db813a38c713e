// --- File: crates/salon_booking/src/doc.rs ---
#![cfg(feature = "openapi")]
use utoipa::OpenApi;

use crate::admin::{BookingList, BookingUpdate};
use crate::assigner::{BookingRequest, Customer};
use crate::availability::{AvailabilityResponse, Slot};
use crate::event_format::BookingSummary;
use crate::handlers::{BookingConfirmation, HealthResponse, ProfessionalView, StatusResponse};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::get_availability_handler,
        crate::handlers::book_handler,
        crate::handlers::list_bookings_handler,
        crate::handlers::cancel_booking_handler,
        crate::handlers::update_booking_handler,
        crate::handlers::list_professionals_handler,
        crate::handlers::health_handler
    ),
    components(schemas(
        AvailabilityResponse,
        Slot,
        BookingRequest,
        Customer,
        BookingConfirmation,
        BookingList,
        BookingSummary,
        BookingUpdate,
        ProfessionalView,
        StatusResponse,
        HealthResponse
    )),
    tags(
        (name = "Booking", description = "Availability and booking"),
        (name = "Admin", description = "Salon-side booking management")
    ),
    servers((url = "/api", description = "Salon booking API"))
)]
pub struct BookingApiDoc;
