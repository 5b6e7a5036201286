//! Bookings domain: slot catalog, booking lifecycle, booking directory

pub mod api;
pub mod domain;
pub mod repository;
pub mod service;

// Re-export domain types at the crate root for convenience
pub use domain::directory::{BookingSummary, BookingView};
pub use domain::entities::{
    Booking, BookingDetailsUpdate, BookingStatus, ExamDetails, DEFAULT_BOOKING_AMOUNT,
    DEFAULT_EXAM_DURATION_MINUTES, DEFAULT_REJECTION_REASON,
};
pub use domain::slots::{resolve_next_occurrence, AvailableSlot, Slot, SlotCatalog, SlotError};
pub use domain::state::{BookingAction, BookingState, BookingStateMachine, StateError};

// Re-export repository types
pub use repository::{BookingRepository, BookingsRepositories};

// Re-export service types
pub use service::{
    BookingCreation, BookingFilter, BookingService, CreateBookingInput, TransitionPayload,
};

// Re-export API types
pub use api::routes;
pub use api::BookingsState;
