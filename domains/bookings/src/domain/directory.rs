//! Booking Directory
//!
//! Pure projections of a set of bookings into the views the dashboard and
//! calendar screens show. Nothing here does I/O. Ties on `exam_date` are
//! broken by id ascending so every view is deterministic.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eklavya_directory::Role;

use crate::domain::entities::{Booking, BookingStatus};

/// Which slice of a user's bookings to show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingView {
    /// Every booking, most recent exam first
    #[default]
    All,
    /// Exams at or after now, soonest first
    Upcoming,
    /// Every booking, most recent exam first, truncated by the caller
    Recent,
}

/// Dashboard counters for one user
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingSummary {
    pub total: usize,
    pub pending: usize,
    pub confirmed: usize,
    pub rejected: usize,
    pub cancelled: usize,
    pub completed: usize,
    pub upcoming: usize,
}

fn ascending(a: &Booking, b: &Booking) -> Ordering {
    a.exam_date.cmp(&b.exam_date).then_with(|| a.id.cmp(&b.id))
}

fn descending(a: &Booking, b: &Booking) -> Ordering {
    b.exam_date.cmp(&a.exam_date).then_with(|| a.id.cmp(&b.id))
}

/// Bookings where the user takes part in the given role
pub fn list_for_user(bookings: &[Booking], user_id: Uuid, role: Role) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| match role {
            Role::Scribe => b.scribe_id == user_id,
            Role::Student => b.student_id == user_id,
        })
        .cloned()
        .collect()
}

/// Bookings whose exam is at or after `now`, soonest first
pub fn upcoming(bookings: &[Booking], now: DateTime<Utc>) -> Vec<Booking> {
    let mut result: Vec<Booking> = bookings
        .iter()
        .filter(|b| b.exam_date >= now)
        .cloned()
        .collect();
    result.sort_by(ascending);
    result
}

/// All bookings, most recent exam first
pub fn recent(bookings: &[Booking]) -> Vec<Booking> {
    let mut result = bookings.to_vec();
    result.sort_by(descending);
    result
}

pub fn with_status(bookings: &[Booking], status: BookingStatus) -> Vec<Booking> {
    bookings
        .iter()
        .filter(|b| b.status == status)
        .cloned()
        .collect()
}

/// Apply a view to an already role-scoped set
pub fn project(bookings: &[Booking], view: BookingView, now: DateTime<Utc>) -> Vec<Booking> {
    match view {
        BookingView::Upcoming => upcoming(bookings, now),
        BookingView::All | BookingView::Recent => recent(bookings),
    }
}

/// Count bookings per status. `upcoming` counts live bookings (pending or
/// confirmed) whose exam has not started.
pub fn summarize(bookings: &[Booking], now: DateTime<Utc>) -> BookingSummary {
    bookings
        .iter()
        .fold(BookingSummary::default(), |mut summary, booking| {
            summary.total += 1;
            match booking.status {
                BookingStatus::Pending => summary.pending += 1,
                BookingStatus::Confirmed => summary.confirmed += 1,
                BookingStatus::Rejected => summary.rejected += 1,
                BookingStatus::Cancelled => summary.cancelled += 1,
                BookingStatus::Completed => summary.completed += 1,
            }
            if !booking.is_terminal() && booking.exam_date >= now {
                summary.upcoming += 1;
            }
            summary
        })
}
