//! Scribe discovery API handlers

use axum::{
    extract::{Path, Query, State},
    Json,
};
use eklavya_auth::AuthUser;
use eklavya_common::{Error, Result};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::middleware::ScribesState;
use crate::domain::entities::ScribeProfile;
use crate::domain::search::{filter_scribes, ScribeSearch, DEFAULT_RADIUS_KM};

/// Query params for the nearby listing
#[derive(Debug, Deserialize)]
pub struct NearbyQuery {
    pub max_distance_km: Option<u32>,
}

/// Search scribes by free text, language and subject
pub async fn search_scribes(
    AuthUser(_ctx): AuthUser,
    State(state): State<ScribesState>,
    Query(search): Query<ScribeSearch>,
) -> Result<Json<Vec<ScribeProfile>>> {
    let scribes = state.repos.scribes.list(search.available_only).await?;
    Ok(Json(filter_scribes(scribes, &search)))
}

/// Available scribes around the caller, best rated first
pub async fn nearby_scribes(
    AuthUser(_ctx): AuthUser,
    State(state): State<ScribesState>,
    Query(query): Query<NearbyQuery>,
) -> Result<Json<Vec<ScribeProfile>>> {
    let radius = query.max_distance_km.unwrap_or(DEFAULT_RADIUS_KM);
    if radius == 0 {
        return Err(Error::Validation(
            "Distance must be at least 1 km".to_string(),
        ));
    }
    let scribes = state.repos.scribes.nearby(radius).await?;
    Ok(Json(scribes))
}

/// Get a single scribe profile
pub async fn get_scribe(
    AuthUser(_ctx): AuthUser,
    State(state): State<ScribesState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ScribeProfile>> {
    let scribe = state
        .repos
        .scribes
        .find(id)
        .await?
        .ok_or_else(|| Error::NotFound("Scribe not found".to_string()))?;
    Ok(Json(scribe))
}
