//! Booking repository over the `bookings` collection

use std::sync::Arc;

use eklavya_common::{Error, Result};
use eklavya_directory::Role;
use eklavya_store::{execute_query, DocumentStore, Query, Record, SortDirection, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::{Booking, BookingStatus};

pub const BOOKINGS_COLLECTION: &str = "bookings";

#[derive(Clone)]
pub struct BookingRepository {
    store: Arc<dyn DocumentStore>,
}

fn to_record(booking: &Booking) -> Result<Record> {
    match serde_json::to_value(booking)? {
        Value::Object(map) => Ok(map),
        _ => Err(Error::Internal(
            "booking did not serialize to an object".to_string(),
        )),
    }
}

fn from_record(record: Record) -> Result<Booking> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        tracing::error!(error = %e, "Malformed booking document");
        e.into()
    })
}

fn party_field(role: Role) -> &'static str {
    match role {
        Role::Student => "studentId",
        Role::Scribe => "scribeId",
    }
}

impl BookingRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Store a newly created booking.
    ///
    /// Returns the booking already stored under the same id, if any, and
    /// leaves it untouched. Ids derived from an idempotency key make this the
    /// point where duplicate submissions meet.
    pub async fn insert(&self, booking: &Booking) -> Result<Option<Booking>> {
        match self
            .store
            .create(BOOKINGS_COLLECTION, &booking.id.to_string(), to_record(booking)?)
            .await
        {
            Ok(()) => Ok(None),
            Err(StoreError::AlreadyExists { .. }) => {
                let existing = self.find(booking.id).await?.ok_or_else(|| {
                    Error::Internal(format!("booking {} vanished after a key clash", booking.id))
                })?;
                Ok(Some(existing))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Find booking by ID
    pub async fn find(&self, id: Uuid) -> Result<Option<Booking>> {
        match self.store.get(BOOKINGS_COLLECTION, &id.to_string()).await {
            Ok(record) => Ok(Some(from_record(record)?)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write a mutated booking back, only if the stored copy is still at
    /// `expected_version`. A concurrent writer surfaces as `Error::Conflict`.
    ///
    /// A `Conflict` can also be the echo of this very write: the store
    /// committed it, the acknowledgement was lost and the retry then found
    /// the bumped version. The stored copy is re-read, and if it is exactly
    /// this booking the save succeeded.
    pub async fn save(&self, booking: &Booking, expected_version: u64) -> Result<Booking> {
        let result = self
            .store
            .patch(
                BOOKINGS_COLLECTION,
                &booking.id.to_string(),
                to_record(booking)?,
                Some(expected_version),
            )
            .await;

        match result {
            Ok(stored) => from_record(stored),
            Err(conflict @ StoreError::Conflict { .. }) => match self.find(booking.id).await? {
                Some(current) if current == *booking => {
                    tracing::warn!(
                        booking_id = %booking.id,
                        version = booking.version,
                        "Save conflicted with its own committed write"
                    );
                    Ok(current)
                }
                _ => Err(conflict.into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    /// Bookings where the user takes part in `role`, ordered by exam date.
    ///
    /// Runs through the query planner, so stores without a composite index
    /// on (party, examDate) still return the same ordering.
    pub async fn list_for_user(
        &self,
        user_id: Uuid,
        role: Role,
        status: Option<BookingStatus>,
        direction: SortDirection,
    ) -> Result<Vec<Booking>> {
        let mut query = Query::new().where_eq(party_field(role), user_id.to_string());
        if let Some(status) = status {
            query = query.where_eq("status", status.as_str());
        }
        let query = query.order_by("examDate", direction);

        let records = execute_query(self.store.as_ref(), BOOKINGS_COLLECTION, &query).await?;
        records.into_iter().map(from_record).collect()
    }
}
