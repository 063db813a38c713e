// --- File: crates/salon_booking/src/routes.rs ---
use axum::{
    routing::{get, patch, post},
    Router,
};
use std::sync::Arc;

use crate::handlers::{
    book_handler, cancel_booking_handler, get_availability_handler, health_handler,
    list_bookings_handler, list_professionals_handler, update_booking_handler, BookingState,
};

/// All booking routes, relative to the API prefix.
pub fn routes(state: Arc<BookingState>) -> Router {
    Router::new()
        .route("/availability", get(get_availability_handler))
        .route("/book", post(book_handler))
        .route("/admin/bookings", get(list_bookings_handler))
        .route(
            "/admin/bookings/{professional}/{event_id}",
            patch(update_booking_handler).delete(cancel_booking_handler),
        )
        .route("/professionals", get(list_professionals_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
