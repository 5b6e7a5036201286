//! Shared utilities, configuration, and error handling for Eklavya
//!
//! This crate provides common functionality used across the booking service:
//! - Configuration management following 12-factor principles
//! - Error taxonomy and its HTTP mapping, including store failures
//! - Injectable clock
//! - Request extractors

pub mod clock;
pub mod config;
pub mod error;
pub mod extractors;
pub mod state;
pub mod store;

pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{Error, Result};
pub use extractors::{Pagination, ValidatedJson};
pub use state::StateError;
