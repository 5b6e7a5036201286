//! Slot listing handler

use axum::{
    extract::{Path, State},
    Json,
};
use eklavya_auth::AuthUser;
use eklavya_common::Result;
use uuid::Uuid;

use crate::api::middleware::BookingsState;
use crate::domain::slots::AvailableSlot;

/// A scribe's weekly slots with their next occurrence, soonest first
pub async fn list_slots(
    AuthUser(_ctx): AuthUser,
    State(state): State<BookingsState>,
    Path(scribe_id): Path<Uuid>,
) -> Result<Json<Vec<AvailableSlot>>> {
    let slots = state.service.available_slots(scribe_id).await?;
    Ok(Json(slots))
}
