//! Booking domain entities
//!
//! A booking is created by a student against a scribe for one exam sitting.
//! Identity, parties and exam time are fixed at creation. Status only moves
//! through `BookingStateMachine`, and every mutation bumps `version` so
//! writes can be compare-and-swapped against the stored copy.

use chrono::{DateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eklavya_common::{Error, Result};
use eklavya_directory::{AccountProfile, Actor, Role};

use crate::domain::state::{BookingAction, BookingState, BookingStateMachine};

/// Amount charged when the scribe has not set an hourly rate
pub const DEFAULT_BOOKING_AMOUNT: Decimal = Decimal::from_parts(500, 0, 0, false, 0);

/// Stored when a scribe rejects without giving a reason
pub const DEFAULT_REJECTION_REASON: &str = "No reason provided";

/// Default length of an exam sitting
pub const DEFAULT_EXAM_DURATION_MINUTES: u32 = 120;

/// Namespace for booking ids derived from idempotency keys
const IDEMPOTENT_BOOKING_NAMESPACE: Uuid = Uuid::from_u128(0x6f1c2a7e_93d4_4b8a_a5e2_1d0c7b3f9e64);

/// Id for a new booking. The same student retrying with the same
/// idempotency key always gets the same id, so duplicates collide on the
/// document key instead of creating a second booking.
pub fn booking_id(student_id: Uuid, idempotency_key: Option<&str>) -> Uuid {
    match idempotency_key {
        Some(key) => {
            let name = format!("{}:{}", student_id, key);
            Uuid::new_v5(&IDEMPOTENT_BOOKING_NAMESPACE, name.as_bytes())
        }
        None => Uuid::new_v4(),
    }
}

/// Booking status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingStatus {
    /// Check if status is terminal
    #[mutants::skip]
    pub fn is_terminal(&self) -> bool {
        self.to_state().is_terminal()
    }

    /// Convert to state machine state
    pub fn to_state(&self) -> BookingState {
        match self {
            BookingStatus::Pending => BookingState::Pending,
            BookingStatus::Confirmed => BookingState::Confirmed,
            BookingStatus::Rejected => BookingState::Rejected,
            BookingStatus::Cancelled => BookingState::Cancelled,
            BookingStatus::Completed => BookingState::Completed,
        }
    }

    /// Create from state machine state
    pub fn from_state(state: BookingState) -> Self {
        match state {
            BookingState::Pending => BookingStatus::Pending,
            BookingState::Confirmed => BookingStatus::Confirmed,
            BookingState::Rejected => BookingStatus::Rejected,
            BookingState::Cancelled => BookingStatus::Cancelled,
            BookingState::Completed => BookingStatus::Completed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Rejected => "rejected",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Exam details captured by the booking form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExamDetails {
    pub exam_date: DateTime<Utc>,
    pub exam_duration_minutes: u32,
    pub subject: String,
    pub board: Option<String>,
    pub venue: String,
    pub notes: Option<String>,
}

/// Partial edit of the free-text fields
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct BookingDetailsUpdate {
    pub subject: Option<String>,
    pub board: Option<String>,
    pub venue: Option<String>,
    pub notes: Option<String>,
}

impl BookingDetailsUpdate {
    pub fn is_empty(&self) -> bool {
        self.subject.is_none() && self.board.is_none() && self.venue.is_none() && self.notes.is_none()
    }
}

/// Booking entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub student_id: Uuid,
    pub student_name: String,
    pub scribe_id: Uuid,
    pub scribe_name: String,
    pub status: BookingStatus,
    pub exam_date: DateTime<Utc>,
    pub exam_duration_minutes: u32,
    pub subject: String,
    #[serde(default)]
    pub board: Option<String>,
    pub venue: String,
    #[serde(default)]
    pub notes: Option<String>,
    pub total_amount: Decimal,
    #[serde(default)]
    pub confirmed_by: Option<Uuid>,
    #[serde(default)]
    pub confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejected_by: Option<Uuid>,
    #[serde(default)]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub rejection_reason: Option<String>,
    #[serde(default)]
    pub completed_by: Option<Uuid>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancelled_by: Option<Uuid>,
    #[serde(default)]
    pub cancelled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub cancellation_reason: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn required_text(value: &str, message: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation(message.to_string()));
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Booking {
    /// Create a pending booking with validation
    pub fn new(
        student: &AccountProfile,
        scribe: &AccountProfile,
        details: ExamDetails,
        hourly_rate: Option<Decimal>,
        idempotency_key: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        if student.role != Role::Student {
            return Err(Error::Forbidden(
                "Only students can book a scribe".to_string(),
            ));
        }
        if scribe.role != Role::Scribe {
            return Err(Error::Validation(
                "The selected account is not a scribe".to_string(),
            ));
        }

        let exam_date = details.exam_date.trunc_subsecs(0);
        if exam_date < now.trunc_subsecs(0) {
            return Err(Error::Validation(
                "Please select an exam date in the future".to_string(),
            ));
        }
        if details.exam_duration_minutes == 0 {
            return Err(Error::Validation(
                "Exam duration must be at least one minute".to_string(),
            ));
        }
        let subject = required_text(&details.subject, "Please enter the exam subject")?;
        let venue = required_text(&details.venue, "Please enter the exam venue")?;

        let total_amount = hourly_rate
            .filter(|rate| !rate.is_zero())
            .unwrap_or(DEFAULT_BOOKING_AMOUNT);
        if total_amount < Decimal::ZERO {
            return Err(Error::Validation(
                "Booking amount cannot be negative".to_string(),
            ));
        }

        Ok(Booking {
            id: booking_id(student.id, idempotency_key.as_deref()),
            student_id: student.id,
            student_name: student.name.clone(),
            scribe_id: scribe.id,
            scribe_name: scribe.name.clone(),
            status: BookingStatus::default(),
            exam_date,
            exam_duration_minutes: details.exam_duration_minutes,
            subject,
            board: optional_text(details.board),
            venue,
            notes: optional_text(details.notes),
            total_amount,
            confirmed_by: None,
            confirmed_at: None,
            rejected_by: None,
            rejected_at: None,
            rejection_reason: None,
            completed_by: None,
            completed_at: None,
            cancelled_by: None,
            cancelled_at: None,
            cancellation_reason: None,
            idempotency_key,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check if booking is terminal
    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Whether `user_id` is the student or the scribe on this booking
    pub fn is_party(&self, user_id: Uuid) -> bool {
        self.student_id == user_id || self.scribe_id == user_id
    }

    /// Check the actor may perform `action` on this booking
    pub fn authorize(&self, action: BookingAction, actor: &Actor) -> Result<()> {
        let allowed = if action.scribe_only() {
            actor.role == Role::Scribe && actor.id == self.scribe_id
        } else {
            self.is_party(actor.id)
        };

        if allowed {
            Ok(())
        } else {
            Err(Error::Forbidden(format!(
                "Not authorized to {} this booking",
                action
            )))
        }
    }

    /// Validate and apply a lifecycle action.
    ///
    /// The actor check runs before the state check, so a stranger always
    /// sees `Forbidden` regardless of the booking's status. On error the
    /// booking is left unchanged.
    pub fn apply(
        &mut self,
        action: BookingAction,
        actor: &Actor,
        reason: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<BookingStatus> {
        self.authorize(action, actor)?;
        let new_state = self.apply_transition(action)?;
        let new_status = BookingStatus::from_state(new_state);

        match action {
            BookingAction::Confirm => {
                self.confirmed_by = Some(actor.id);
                self.confirmed_at = Some(now);
            }
            BookingAction::Reject => {
                self.rejected_by = Some(actor.id);
                self.rejected_at = Some(now);
                self.rejection_reason = Some(
                    optional_text(reason).unwrap_or_else(|| DEFAULT_REJECTION_REASON.to_string()),
                );
            }
            BookingAction::Complete => {
                self.completed_by = Some(actor.id);
                self.completed_at = Some(now);
            }
            BookingAction::Cancel => {
                self.cancelled_by = Some(actor.id);
                self.cancelled_at = Some(now);
                self.cancellation_reason = optional_text(reason);
            }
        }

        self.status = new_status;
        self.touch(now);
        Ok(new_status)
    }

    pub fn confirm(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<()> {
        self.apply(BookingAction::Confirm, actor, None, now).map(|_| ())
    }

    pub fn reject(&mut self, actor: &Actor, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        self.apply(BookingAction::Reject, actor, reason, now).map(|_| ())
    }

    pub fn complete(&mut self, actor: &Actor, now: DateTime<Utc>) -> Result<()> {
        self.apply(BookingAction::Complete, actor, None, now).map(|_| ())
    }

    pub fn cancel(&mut self, actor: &Actor, reason: Option<String>, now: DateTime<Utc>) -> Result<()> {
        self.apply(BookingAction::Cancel, actor, reason, now).map(|_| ())
    }

    /// Edit the free-text fields. Only the student may edit, and only while
    /// the booking is pending.
    pub fn update_details(
        &mut self,
        actor: &Actor,
        update: BookingDetailsUpdate,
        now: DateTime<Utc>,
    ) -> Result<()> {
        if actor.id != self.student_id {
            return Err(Error::Forbidden(
                "Only the student who made this booking can edit it".to_string(),
            ));
        }
        BookingStateMachine::check_editable(self.status.to_state())?;
        if update.is_empty() {
            return Err(Error::Validation("Nothing to update".to_string()));
        }

        let subject = match &update.subject {
            Some(s) => Some(required_text(s, "Please enter the exam subject")?),
            None => None,
        };
        let venue = match &update.venue {
            Some(v) => Some(required_text(v, "Please enter the exam venue")?),
            None => None,
        };

        if let Some(subject) = subject {
            self.subject = subject;
        }
        if let Some(venue) = venue {
            self.venue = venue;
        }
        if update.board.is_some() {
            self.board = optional_text(update.board);
        }
        if update.notes.is_some() {
            self.notes = optional_text(update.notes);
        }

        self.touch(now);
        Ok(())
    }

    fn apply_transition(&self, action: BookingAction) -> Result<BookingState> {
        BookingStateMachine::transition(self.status.to_state(), action).map_err(Error::from)
    }

    fn touch(&mut self, now: DateTime<Utc>) {
        self.version += 1;
        self.updated_at = now;
    }
}
