//! Domain layer for bookings

pub mod directory;
pub mod entities;
pub mod slots;
pub mod state;
