//! Scribes domain: scribe profiles, search, nearby listing

pub mod api;
pub mod domain;
pub mod repository;

// Re-export domain types at the crate root for convenience
pub use domain::entities::ScribeProfile;
pub use domain::search::{filter_scribes, ScribeSearch, ANY, NEARBY_LIMIT};

// Re-export repository types
pub use repository::{ScribeRepository, ScribesRepositories};

// Re-export API types
pub use api::routes;
pub use api::ScribesState;
