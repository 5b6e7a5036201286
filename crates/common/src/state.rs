//! Common state machine error types
//!
//! Shared across domain crates that implement lifecycle state machines.

use thiserror::Error;

use crate::error::Error;

/// Errors that can occur during state transitions
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("cannot {action} a booking that is {from}")]
    InvalidTransition { from: String, action: String },

    #[error("booking is {state} and can no longer change (attempted {action})")]
    TerminalState { state: String, action: String },

    #[error("guard condition failed: {0}")]
    GuardFailed(String),
}

impl From<StateError> for Error {
    fn from(err: StateError) -> Self {
        let message = match &err {
            StateError::InvalidTransition { from, action } => {
                format!("Booking is {} and cannot be {}", from, past_tense(action))
            }
            StateError::TerminalState { state, action } => {
                format!(
                    "Booking is already {} and cannot be {}",
                    state,
                    past_tense(action)
                )
            }
            StateError::GuardFailed(msg) => msg.clone(),
        };
        Error::InvalidTransition(message)
    }
}

fn past_tense(action: &str) -> String {
    match action {
        "confirm" => "confirmed".to_string(),
        "reject" => "rejected".to_string(),
        "complete" => "completed".to_string(),
        "cancel" => "cancelled".to_string(),
        "edit" => "edited".to_string(),
        other => other.to_string(),
    }
}
