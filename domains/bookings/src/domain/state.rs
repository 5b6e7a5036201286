//! Booking lifecycle state machine
//!
//! ```text
//! pending ──confirm──▶ confirmed ──complete──▶ completed
//!    │                     │
//!    ├──reject──▶ rejected │
//!    └──cancel──▶ cancelled ◀──cancel──┘
//! ```
//!
//! `rejected`, `cancelled` and `completed` are terminal. No transition
//! returns to `pending`.

use serde::{Deserialize, Serialize};

pub use eklavya_common::StateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BookingState {
    Pending,
    Confirmed,
    Rejected,
    Cancelled,
    Completed,
}

impl BookingState {
    /// Check if this is a terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected | Self::Cancelled | Self::Completed)
    }

    /// Get all valid next states from current state
    pub fn valid_transitions(&self) -> &'static [BookingState] {
        match self {
            Self::Pending => &[Self::Confirmed, Self::Rejected, Self::Cancelled],
            Self::Confirmed => &[Self::Completed, Self::Cancelled],
            Self::Rejected => &[],
            Self::Cancelled => &[],
            Self::Completed => &[],
        }
    }
}

impl std::fmt::Display for BookingState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Rejected => write!(f, "rejected"),
            Self::Cancelled => write!(f, "cancelled"),
            Self::Completed => write!(f, "completed"),
        }
    }
}

/// Actions that drive booking transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingAction {
    /// Scribe accepts a pending request
    Confirm,
    /// Scribe declines a pending request
    Reject,
    /// Scribe marks a confirmed booking as done
    Complete,
    /// Either party withdraws
    Cancel,
}

impl BookingAction {
    /// Whether only the booking's scribe may perform this action
    pub fn scribe_only(&self) -> bool {
        !matches!(self, Self::Cancel)
    }
}

impl std::fmt::Display for BookingAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Confirm => write!(f, "confirm"),
            Self::Reject => write!(f, "reject"),
            Self::Complete => write!(f, "complete"),
            Self::Cancel => write!(f, "cancel"),
        }
    }
}

impl std::str::FromStr for BookingAction {
    type Err = eklavya_common::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirm" => Ok(Self::Confirm),
            "reject" => Ok(Self::Reject),
            "complete" => Ok(Self::Complete),
            "cancel" => Ok(Self::Cancel),
            other => Err(eklavya_common::Error::NotFound(format!(
                "Unknown booking action '{}'",
                other
            ))),
        }
    }
}

/// Booking state machine
pub struct BookingStateMachine;

impl BookingStateMachine {
    /// Attempt a state transition
    ///
    /// Returns the new state if the transition is valid, or an error otherwise.
    pub fn transition(
        current: BookingState,
        action: BookingAction,
    ) -> Result<BookingState, StateError> {
        if current.is_terminal() {
            return Err(StateError::TerminalState {
                state: current.to_string(),
                action: action.to_string(),
            });
        }

        let next = match (current, action) {
            (BookingState::Pending, BookingAction::Confirm) => BookingState::Confirmed,
            (BookingState::Pending, BookingAction::Reject) => BookingState::Rejected,
            (BookingState::Pending, BookingAction::Cancel) => BookingState::Cancelled,

            (BookingState::Confirmed, BookingAction::Complete) => BookingState::Completed,
            (BookingState::Confirmed, BookingAction::Cancel) => BookingState::Cancelled,

            _ => {
                return Err(StateError::InvalidTransition {
                    from: current.to_string(),
                    action: action.to_string(),
                });
            }
        };

        Ok(next)
    }

    /// Check if a transition is valid without performing it
    pub fn can_transition(current: BookingState, action: BookingAction) -> bool {
        Self::transition(current, action).is_ok()
    }

    /// Booking details can only change before the scribe has responded
    pub fn check_editable(current: BookingState) -> Result<(), StateError> {
        match current {
            BookingState::Pending => Ok(()),
            state if state.is_terminal() => Err(StateError::TerminalState {
                state: state.to_string(),
                action: "edit".to_string(),
            }),
            state => Err(StateError::InvalidTransition {
                from: state.to_string(),
                action: "edit".to_string(),
            }),
        }
    }
}
