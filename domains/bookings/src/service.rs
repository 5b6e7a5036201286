//! Booking service
//!
//! The operations callers use to create, move and read bookings. Every
//! operation takes the acting party explicitly. Writes go through the
//! repository's compare-and-swap, so two parties acting on the same booking
//! at once cannot silently overwrite each other.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use eklavya_common::{Clock, Error, Result};
use eklavya_directory::{AccountDirectory, Actor, DirectoryError, Role};
use eklavya_scribes::ScribeRepository;
use eklavya_store::SortDirection;

use crate::domain::directory::{self, BookingSummary, BookingView};
use crate::domain::entities::{
    booking_id, Booking, BookingDetailsUpdate, BookingStatus, ExamDetails,
    DEFAULT_EXAM_DURATION_MINUTES,
};
use crate::domain::slots::{AvailableSlot, SlotCatalog};
use crate::domain::state::BookingAction;
use crate::repository::BookingsRepositories;

/// Everything a student supplies to request a scribe
#[derive(Debug, Clone, Default)]
pub struct CreateBookingInput {
    pub scribe_id: Uuid,
    /// Explicit exam start. Takes precedence over `slot`.
    pub exam_date: Option<DateTime<Utc>>,
    /// Slot label such as "Tue 14:00", booked at its next occurrence
    pub slot: Option<String>,
    pub exam_duration_minutes: Option<u32>,
    pub subject: String,
    pub board: Option<String>,
    pub venue: String,
    pub notes: Option<String>,
    pub idempotency_key: Option<String>,
}

/// Result of `create_booking`
#[derive(Debug, Clone)]
pub struct BookingCreation {
    pub booking: Booking,
    /// True when an earlier booking with the same idempotency key was returned
    pub replayed: bool,
}

/// Optional data carried by a lifecycle action
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransitionPayload {
    pub reason: Option<String>,
    /// Version the caller last saw; a mismatch fails with `Conflict`
    pub expected_version: Option<u64>,
}

/// Which of the actor's bookings to list
#[derive(Debug, Clone, Default)]
pub struct BookingFilter {
    pub view: BookingView,
    pub status: Option<BookingStatus>,
    pub limit: Option<usize>,
}

#[derive(Clone)]
pub struct BookingService {
    repos: BookingsRepositories,
    scribes: ScribeRepository,
    directory: Arc<dyn AccountDirectory>,
    clock: Arc<dyn Clock>,
}

fn not_found() -> Error {
    Error::NotFound("Booking not found".to_string())
}

fn replay(existing: Booking) -> BookingCreation {
    info!(booking_id = %existing.id, "Replaying booking for idempotency key");
    BookingCreation {
        booking: existing,
        replayed: true,
    }
}

impl BookingService {
    pub fn new(
        repos: BookingsRepositories,
        scribes: ScribeRepository,
        directory: Arc<dyn AccountDirectory>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repos,
            scribes,
            directory,
            clock,
        }
    }

    /// Create a pending booking for the acting student
    pub async fn create_booking(
        &self,
        actor: &Actor,
        input: CreateBookingInput,
    ) -> Result<BookingCreation> {
        if actor.role != Role::Student {
            return Err(Error::Forbidden(
                "Only students can book a scribe".to_string(),
            ));
        }

        if let Some(key) = input.idempotency_key.as_deref() {
            let id = booking_id(actor.id, Some(key));
            if let Some(existing) = self.repos.bookings.find(id).await? {
                return Ok(replay(existing));
            }
        }

        let student = self.directory.resolve(actor.id).await?;
        let scribe = match self.directory.resolve(input.scribe_id).await {
            Ok(profile) if profile.role == Role::Scribe => profile,
            Ok(_) | Err(DirectoryError::NotFound(_)) => {
                return Err(Error::Validation(
                    "The selected scribe does not exist".to_string(),
                ))
            }
            Err(e) => return Err(e.into()),
        };
        let profile = self.scribes.find(scribe.id).await?;

        let now = self.clock.now();
        let exam_date = match (input.exam_date, input.slot.as_deref()) {
            (Some(date), _) => date,
            (None, Some(label)) => {
                let labels = profile.as_ref().map(|p| p.slots.as_slice()).unwrap_or(&[]);
                SlotCatalog::from_labels(labels)?
                    .select(label)?
                    .next_occurrence(now)
            }
            (None, None) => {
                return Err(Error::Validation("Please select a time slot".to_string()));
            }
        };

        let details = ExamDetails {
            exam_date,
            exam_duration_minutes: input
                .exam_duration_minutes
                .unwrap_or(DEFAULT_EXAM_DURATION_MINUTES),
            subject: input.subject,
            board: input.board,
            venue: input.venue,
            notes: input.notes,
        };
        let rate = profile.as_ref().and_then(|p| p.billable_rate());
        let booking = Booking::new(&student, &scribe, details, rate, input.idempotency_key, now)?;

        if let Some(existing) = self.repos.bookings.insert(&booking).await? {
            return Ok(replay(existing));
        }
        info!(
            booking_id = %booking.id,
            student_id = %booking.student_id,
            scribe_id = %booking.scribe_id,
            exam_date = %booking.exam_date,
            "Booking created"
        );

        Ok(BookingCreation {
            booking,
            replayed: false,
        })
    }

    /// Apply a lifecycle action to a booking
    pub async fn transition_booking(
        &self,
        id: Uuid,
        action: BookingAction,
        actor: &Actor,
        payload: TransitionPayload,
    ) -> Result<Booking> {
        let mut booking = self.repos.bookings.find(id).await?.ok_or_else(not_found)?;
        if !booking.is_party(actor.id) {
            return Err(Error::Forbidden(format!(
                "Not authorized to {} this booking",
                action
            )));
        }
        let loaded_version = booking.version;
        if let Some(expected) = payload.expected_version {
            if expected != loaded_version {
                return Err(Error::Conflict(
                    "The booking was changed by someone else, reload and try again".to_string(),
                ));
            }
        }

        let from = booking.status;
        let to = booking.apply(action, actor, payload.reason, self.clock.now())?;
        let saved = self.repos.bookings.save(&booking, loaded_version).await?;

        info!(
            booking_id = %id,
            action = %action,
            from = %from,
            to = %to,
            actor_id = %actor.id,
            "Booking transitioned"
        );
        Ok(saved)
    }

    /// A booking the actor takes part in
    pub async fn get_booking(&self, id: Uuid, actor: &Actor) -> Result<Booking> {
        let booking = self.repos.bookings.find(id).await?.ok_or_else(not_found)?;
        if !booking.is_party(actor.id) {
            return Err(not_found());
        }
        Ok(booking)
    }

    /// The actor's bookings in their own role
    pub async fn list_bookings(&self, actor: &Actor, filter: BookingFilter) -> Result<Vec<Booking>> {
        let direction = match filter.view {
            BookingView::Upcoming => SortDirection::Ascending,
            BookingView::All | BookingView::Recent => SortDirection::Descending,
        };
        let bookings = self
            .repos
            .bookings
            .list_for_user(actor.id, actor.role, filter.status, direction)
            .await?;

        let mut projected = directory::project(&bookings, filter.view, self.clock.now());
        if let Some(limit) = filter.limit {
            projected.truncate(limit);
        }
        Ok(projected)
    }

    /// Edit the free-text fields of a pending booking
    pub async fn update_booking_details(
        &self,
        id: Uuid,
        actor: &Actor,
        update: BookingDetailsUpdate,
    ) -> Result<Booking> {
        let mut booking = self.get_booking(id, actor).await?;
        let loaded_version = booking.version;
        booking.update_details(actor, update, self.clock.now())?;
        let saved = self.repos.bookings.save(&booking, loaded_version).await?;

        info!(booking_id = %id, actor_id = %actor.id, "Booking details updated");
        Ok(saved)
    }

    /// Dashboard counters for the actor
    pub async fn booking_summary(&self, actor: &Actor) -> Result<BookingSummary> {
        let bookings = self
            .repos
            .bookings
            .list_for_user(actor.id, actor.role, None, SortDirection::Ascending)
            .await?;
        Ok(directory::summarize(&bookings, self.clock.now()))
    }

    /// The scribe's slot catalog with each slot's next occurrence
    pub async fn available_slots(&self, scribe_id: Uuid) -> Result<Vec<AvailableSlot>> {
        let profile = self
            .scribes
            .find(scribe_id)
            .await?
            .ok_or_else(|| Error::NotFound("Scribe not found".to_string()))?;
        let catalog = SlotCatalog::from_labels(&profile.slots)?;
        Ok(catalog.upcoming(self.clock.now()))
    }
}
