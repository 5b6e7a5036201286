//! HTTP surface for the Bookings domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::BookingsState;
pub use routes::routes;
