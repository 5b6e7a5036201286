//! Slot Catalog
//!
//! A slot is a weekly recurring weekday + time of day, written as a label
//! such as `"Tue 14:00"`. Slot times are UTC. Booking a slot means booking
//! its next occurrence.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Days, NaiveTime, Utc, Weekday};
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use eklavya_common::Error;

lazy_static::lazy_static! {
    /// Weekday name, whitespace, then HH:MM on a 24 hour clock
    static ref SLOT_LABEL_REGEX: Regex =
        Regex::new(r"^\s*([A-Za-z]{3,9})\s+(\d{1,2}):(\d{2})\s*$").unwrap();
}

/// Labels offered when a scribe has not published their own week
pub const DEFAULT_WEEK: [&str; 6] = [
    "Mon 10:00",
    "Tue 14:00",
    "Wed 09:00",
    "Thu 11:00",
    "Fri 15:00",
    "Sat 08:00",
];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SlotError {
    #[error("Invalid slot '{0}': use a weekday and time like \"Tue 14:00\"")]
    InvalidSlot(String),
}

impl From<SlotError> for Error {
    fn from(err: SlotError) -> Self {
        Error::Validation(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub weekday: Weekday,
    pub time: NaiveTime,
}

impl Slot {
    pub fn new(weekday: Weekday, time: NaiveTime) -> Self {
        Self { weekday, time }
    }

    /// Parse weekday and time given separately
    pub fn from_parts(weekday: &str, time: &str) -> Result<Self, SlotError> {
        format!("{} {}", weekday, time).parse()
    }

    /// First instant on or after `now` that falls on this slot
    pub fn next_occurrence(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.date_naive();
        let days_ahead = (7 + self.weekday.num_days_from_monday()
            - today.weekday().num_days_from_monday())
            % 7;
        let candidate = (today + Days::new(u64::from(days_ahead)))
            .and_time(self.time)
            .and_utc();

        if candidate < now {
            candidate + Days::new(7)
        } else {
            candidate
        }
    }
}

impl FromStr for Slot {
    type Err = SlotError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        let invalid = || SlotError::InvalidSlot(label.trim().to_string());

        let caps = SLOT_LABEL_REGEX.captures(label).ok_or_else(invalid)?;
        let weekday: Weekday = caps[1].parse().map_err(|_| invalid())?;
        let hour: u32 = caps[2].parse().map_err(|_| invalid())?;
        let minute: u32 = caps[3].parse().map_err(|_| invalid())?;
        let time = NaiveTime::from_hms_opt(hour, minute, 0).ok_or_else(invalid)?;

        Ok(Slot { weekday, time })
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.weekday, self.time.format("%H:%M"))
    }
}

/// Next calendar instant on or after `now` matching `weekday` and `time`
pub fn resolve_next_occurrence(
    weekday: &str,
    time: &str,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, SlotError> {
    Ok(Slot::from_parts(weekday, time)?.next_occurrence(now))
}

/// A slot paired with its next occurrence
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableSlot {
    pub label: String,
    pub next_occurrence: DateTime<Utc>,
}

/// The set of slots a scribe offers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
}

impl SlotCatalog {
    /// The six-slot week offered by default
    pub fn default_week() -> Self {
        Self {
            slots: DEFAULT_WEEK
                .iter()
                .filter_map(|label| label.parse().ok())
                .collect(),
        }
    }

    /// Catalog from published labels; no labels means the default week
    pub fn from_labels<S: AsRef<str>>(labels: &[S]) -> Result<Self, SlotError> {
        if labels.is_empty() {
            return Ok(Self::default_week());
        }
        let slots = labels
            .iter()
            .map(|label| label.as_ref().parse())
            .collect::<Result<Vec<Slot>, _>>()?;
        Ok(Self { slots })
    }

    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Parse `label` and check it is offered here
    pub fn select(&self, label: &str) -> std::result::Result<Slot, Error> {
        let slot: Slot = label.parse()?;
        if self.slots.contains(&slot) {
            Ok(slot)
        } else {
            Err(Error::Validation(format!(
                "The slot {} is not offered by this scribe",
                slot
            )))
        }
    }

    /// Every slot with its next occurrence, soonest first
    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<AvailableSlot> {
        let mut slots: Vec<AvailableSlot> = self
            .slots
            .iter()
            .map(|slot| AvailableSlot {
                label: slot.to_string(),
                next_occurrence: slot.next_occurrence(now),
            })
            .collect();
        slots.sort_by(|a, b| a.next_occurrence.cmp(&b.next_occurrence));
        slots
    }
}

impl Default for SlotCatalog {
    fn default() -> Self {
        Self::default_week()
    }
}
