//! API handlers for Bookings domain

pub mod bookings;
pub mod slots;
