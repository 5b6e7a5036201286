//! Route definitions for Scribes domain API

use axum::{routing::get, Router};

use super::handlers::scribes;
use super::middleware::ScribesState;

/// Create all Scribes domain API routes
pub fn routes() -> Router<ScribesState> {
    Router::new()
        .route("/v1/scribes", get(scribes::search_scribes))
        .route("/v1/scribes/nearby", get(scribes::nearby_scribes))
        .route("/v1/scribes/{id}", get(scribes::get_scribe))
}
