//! Repository implementations for the Bookings domain

pub mod bookings;

use std::sync::Arc;

use eklavya_store::DocumentStore;

pub use bookings::BookingRepository;

/// Combined repository access for the Bookings domain
#[derive(Clone)]
pub struct BookingsRepositories {
    store: Arc<dyn DocumentStore>,
    pub bookings: BookingRepository,
}

impl BookingsRepositories {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            bookings: BookingRepository::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying store (for cross-domain reads)
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
