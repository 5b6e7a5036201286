//! Repository implementations for the Scribes domain

pub mod scribes;

use std::sync::Arc;

use eklavya_store::DocumentStore;

pub use scribes::ScribeRepository;

/// Combined repository access for the Scribes domain
#[derive(Clone)]
pub struct ScribesRepositories {
    store: Arc<dyn DocumentStore>,
    pub scribes: ScribeRepository,
}

impl ScribesRepositories {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            scribes: ScribeRepository::new(Arc::clone(&store)),
            store,
        }
    }

    /// The underlying store (for cross-domain reads)
    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }
}
