//! Bookings domain state and auth backend integration

use axum::extract::FromRef;
use eklavya_auth::AuthBackend;

use crate::BookingService;

/// Application state for the Bookings domain
#[derive(Clone)]
pub struct BookingsState {
    pub service: BookingService,
    pub auth: AuthBackend,
}

impl FromRef<BookingsState> for AuthBackend {
    fn from_ref(state: &BookingsState) -> Self {
        state.auth.clone()
    }
}
