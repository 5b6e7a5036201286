//! API endpoint integration tests
//!
//! Bookings lifecycle, listing views, slots and scribe discovery, driven
//! through the composed router.

#![allow(dead_code)]

mod auth;
mod bookings;
mod common;
mod lifecycle;
mod scribes;
