//! Scribe profile entity
//!
//! Profiles are owned by the scribe account they describe. `rating` and
//! `totalBookings` are aggregates maintained elsewhere and read as-is here.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use eklavya_common::{Error, Result};

/// Highest rating a scribe can hold
pub const MAX_RATING: f64 = 5.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScribeProfile {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub languages: BTreeSet<String>,
    #[serde(default)]
    pub subjects: BTreeSet<String>,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub experience: String,
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    #[serde(default)]
    pub is_available: bool,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub total_bookings: u32,
    /// Scribe-specific weekly slots such as "Tue 14:00"; empty means the
    /// default week applies
    #[serde(default)]
    pub slots: Vec<String>,
}

impl ScribeProfile {
    /// A fresh, available profile with no ratings yet
    pub fn new(id: Uuid, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            city: String::new(),
            languages: BTreeSet::new(),
            subjects: BTreeSet::new(),
            bio: String::new(),
            experience: String::new(),
            hourly_rate: None,
            is_available: true,
            rating: 0.0,
            total_bookings: 0,
            slots: Vec::new(),
        }
    }

    /// Check field ranges
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Validation("Scribe name cannot be empty".to_string()));
        }

        if let Some(rate) = self.hourly_rate {
            if rate < Decimal::ZERO {
                return Err(Error::Validation(
                    "Hourly rate cannot be negative".to_string(),
                ));
            }
        }

        if !(0.0..=MAX_RATING).contains(&self.rating) {
            return Err(Error::Validation(format!(
                "Rating must be between 0 and {}",
                MAX_RATING
            )));
        }

        Ok(())
    }

    /// Rate charged for a booking, if the scribe has set one
    pub fn billable_rate(&self) -> Option<Decimal> {
        self.hourly_rate.filter(|rate| !rate.is_zero())
    }

    pub fn speaks(&self, language: &str) -> bool {
        self.languages.contains(language)
    }

    pub fn teaches(&self, subject: &str) -> bool {
        self.subjects.contains(subject)
    }
}
