//! Route definitions for Bookings domain API

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{bookings, slots};
use super::middleware::BookingsState;

/// Create all Bookings domain API routes
pub fn routes() -> Router<BookingsState> {
    Router::new()
        .route(
            "/v1/bookings",
            post(bookings::create_booking).get(bookings::list_bookings),
        )
        .route("/v1/bookings/summary", get(bookings::booking_summary))
        .route(
            "/v1/bookings/{id}",
            get(bookings::get_booking).patch(bookings::update_booking),
        )
        .route(
            "/v1/bookings/{id}/{action}",
            post(bookings::transition_booking),
        )
        .route("/v1/scribes/{id}/slots", get(slots::list_slots))
}
