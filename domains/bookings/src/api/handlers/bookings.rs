//! Booking API handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use eklavya_auth::AuthUser;
use eklavya_common::{Pagination, Result, ValidatedJson};
use regex::Regex;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::api::middleware::BookingsState;
use crate::domain::directory::{BookingSummary, BookingView};
use crate::domain::entities::{Booking, BookingDetailsUpdate, BookingStatus};
use crate::domain::state::BookingAction;
use crate::service::{BookingFilter, CreateBookingInput, TransitionPayload};

lazy_static::lazy_static! {
    /// Client generated request keys: letters, digits and `-_.:`
    static ref IDEMPOTENCY_KEY_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9_.:\-]{1,128}$").unwrap();
}

fn validate_idempotency_key(key: &str) -> std::result::Result<(), validator::ValidationError> {
    if IDEMPOTENCY_KEY_REGEX.is_match(key) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_format"))
    }
}

/// Request for creating a booking
#[derive(Debug, Deserialize, Validate)]
pub struct CreateBookingRequest {
    pub scribe_id: Uuid,

    /// Exact exam start; alternative to `slot`
    pub exam_date: Option<DateTime<Utc>>,

    /// Slot label such as "Tue 14:00"
    pub slot: Option<String>,

    #[validate(range(min = 1, max = 720, message = "Exam duration must be between 1 and 720 minutes"))]
    pub exam_duration_minutes: Option<u32>,

    #[validate(length(min = 1, max = 200, message = "Please enter the exam subject"))]
    pub subject: String,

    #[validate(length(max = 100))]
    pub board: Option<String>,

    #[validate(length(min = 1, max = 300, message = "Please enter the exam venue"))]
    pub venue: String,

    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,

    #[validate(custom(
        function = "validate_idempotency_key",
        message = "Idempotency key may only contain letters, digits and -_.:"
    ))]
    pub idempotency_key: Option<String>,
}

impl From<CreateBookingRequest> for CreateBookingInput {
    fn from(req: CreateBookingRequest) -> Self {
        Self {
            scribe_id: req.scribe_id,
            exam_date: req.exam_date,
            slot: req.slot,
            exam_duration_minutes: req.exam_duration_minutes,
            subject: req.subject,
            board: req.board,
            venue: req.venue,
            notes: req.notes,
            idempotency_key: req.idempotency_key,
        }
    }
}

/// Request for editing a pending booking
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBookingRequest {
    #[validate(length(max = 200))]
    pub subject: Option<String>,
    #[validate(length(max = 100))]
    pub board: Option<String>,
    #[validate(length(max = 300))]
    pub venue: Option<String>,
    #[validate(length(max = 2000, message = "Notes must be at most 2000 characters"))]
    pub notes: Option<String>,
}

/// Body of a lifecycle action
#[derive(Debug, Default, Deserialize, Validate)]
pub struct TransitionRequest {
    #[validate(length(max = 500, message = "Reason must be at most 500 characters"))]
    pub reason: Option<String>,
    pub expected_version: Option<u64>,
}

/// Query params for listing bookings
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    #[serde(default)]
    pub view: BookingView,
    pub status: Option<BookingStatus>,
}

/// Create a booking as the authenticated student
pub async fn create_booking(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
    ValidatedJson(req): ValidatedJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<Booking>)> {
    let created = state
        .service
        .create_booking(&ctx.actor(), req.into())
        .await?;

    let status = if created.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(created.booking)))
}

/// List the caller's bookings in their own role
pub async fn list_bookings(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
    Query(query): Query<ListBookingsQuery>,
    Query(page): Query<Pagination>,
) -> Result<Json<Vec<Booking>>> {
    let filter = BookingFilter {
        view: query.view,
        status: query.status,
        limit: Some(page.limit()),
    };
    let bookings = state.service.list_bookings(&ctx.actor(), filter).await?;
    Ok(Json(bookings))
}

/// Dashboard counters for the caller
pub async fn booking_summary(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
) -> Result<Json<BookingSummary>> {
    let summary = state.service.booking_summary(&ctx.actor()).await?;
    Ok(Json(summary))
}

/// Get a single booking the caller takes part in
pub async fn get_booking(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Booking>> {
    let booking = state.service.get_booking(id, &ctx.actor()).await?;
    Ok(Json(booking))
}

/// Edit subject, board, venue or notes while the booking is pending
pub async fn update_booking(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
    Path(id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateBookingRequest>,
) -> Result<Json<Booking>> {
    let update = BookingDetailsUpdate {
        subject: req.subject,
        board: req.board,
        venue: req.venue,
        notes: req.notes,
    };
    let booking = state
        .service
        .update_booking_details(id, &ctx.actor(), update)
        .await?;
    Ok(Json(booking))
}

/// Confirm, reject, complete or cancel a booking
pub async fn transition_booking(
    AuthUser(ctx): AuthUser,
    State(state): State<BookingsState>,
    Path((id, action)): Path<(Uuid, String)>,
    body: Option<ValidatedJson<TransitionRequest>>,
) -> Result<Json<Booking>> {
    let action: BookingAction = action.parse()?;
    let ValidatedJson(req) = body.unwrap_or(ValidatedJson(TransitionRequest::default()));

    let payload = TransitionPayload {
        reason: req.reason,
        expected_version: req.expected_version,
    };
    let booking = state
        .service
        .transition_booking(id, action, &ctx.actor(), payload)
        .await?;
    Ok(Json(booking))
}
