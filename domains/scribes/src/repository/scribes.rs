//! Scribe profile repository over the `scribes` collection

use std::sync::Arc;

use eklavya_common::Result;
use eklavya_store::{execute_query, DocumentStore, Query, Record, SortDirection, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::domain::entities::ScribeProfile;
use crate::domain::search::NEARBY_LIMIT;

pub const SCRIBES_COLLECTION: &str = "scribes";

#[derive(Clone)]
pub struct ScribeRepository {
    store: Arc<dyn DocumentStore>,
}

fn to_record(profile: &ScribeProfile) -> Result<Record> {
    match serde_json::to_value(profile)? {
        Value::Object(map) => Ok(map),
        _ => Err(eklavya_common::Error::Internal(
            "scribe profile did not serialize to an object".to_string(),
        )),
    }
}

fn from_record(record: Record) -> Result<ScribeProfile> {
    serde_json::from_value(Value::Object(record)).map_err(|e| {
        tracing::error!(error = %e, "Malformed scribe document");
        e.into()
    })
}

impl ScribeRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Create or replace a profile
    pub async fn upsert(&self, profile: &ScribeProfile) -> Result<()> {
        profile.validate()?;
        self.store
            .put(SCRIBES_COLLECTION, &profile.id.to_string(), to_record(profile)?)
            .await?;
        Ok(())
    }

    /// Find a profile by scribe account id
    pub async fn find(&self, id: Uuid) -> Result<Option<ScribeProfile>> {
        match self.store.get(SCRIBES_COLLECTION, &id.to_string()).await {
            Ok(record) => Ok(Some(from_record(record)?)),
            Err(StoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// All profiles, optionally only those accepting bookings, ordered by id
    pub async fn list(&self, available_only: bool) -> Result<Vec<ScribeProfile>> {
        let mut query = Query::new();
        if available_only {
            query = query.where_eq("isAvailable", true);
        }
        let records = self.store.query(SCRIBES_COLLECTION, &query).await?;
        records.into_iter().map(from_record).collect()
    }

    /// Available scribes, best rated first. Distance is not considered.
    pub async fn nearby(&self, max_distance_km: u32) -> Result<Vec<ScribeProfile>> {
        tracing::debug!(max_distance_km, "Listing nearby scribes");
        let query = Query::new()
            .where_eq("isAvailable", true)
            .order_by("rating", SortDirection::Descending)
            .limit(NEARBY_LIMIT);
        let records = execute_query(self.store.as_ref(), SCRIBES_COLLECTION, &query).await?;
        records.into_iter().map(from_record).collect()
    }
}
