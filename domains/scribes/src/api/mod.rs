//! HTTP surface for the Scribes domain

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use middleware::ScribesState;
pub use routes::routes;
