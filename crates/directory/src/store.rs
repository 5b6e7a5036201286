//! Account directory backed by the `users` collection of the Persistent Store

use std::sync::Arc;

use eklavya_store::{DocumentStore, Record, StoreError};
use serde_json::Value;
use uuid::Uuid;

use crate::{AccountDirectory, AccountProfile, DirectoryError, Role};

pub const USERS_COLLECTION: &str = "users";

#[derive(Clone)]
pub struct StoreAccountDirectory {
    store: Arc<dyn DocumentStore>,
}

impl StoreAccountDirectory {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Write an account into the directory
    pub async fn register(&self, profile: &AccountProfile) -> Result<(), DirectoryError> {
        let mut record = Record::new();
        record.insert("name".to_string(), Value::String(profile.name.clone()));
        record.insert("email".to_string(), Value::String(profile.email.clone()));
        record.insert("role".to_string(), Value::String(profile.role.to_string()));
        self.store
            .put(USERS_COLLECTION, &profile.id.to_string(), record)
            .await
            .map_err(|e| map_store_error(e, profile.id))
    }
}

fn map_store_error(err: StoreError, id: Uuid) -> DirectoryError {
    match err {
        StoreError::NotFound { .. } => DirectoryError::NotFound(id),
        e if e.is_transient() => DirectoryError::Unavailable(e.to_string()),
        e => DirectoryError::InvalidData(e.to_string()),
    }
}

fn text_field(record: &Record, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Validate a stored user document at the boundary
fn profile_from_record(id: Uuid, record: &Record) -> Result<AccountProfile, DirectoryError> {
    let role = match record.get("role").and_then(Value::as_str) {
        Some("student") => Role::Student,
        Some("scribe") => Role::Scribe,
        other => {
            return Err(DirectoryError::InvalidData(format!(
                "account {} has unknown role {:?}",
                id, other
            )))
        }
    };

    Ok(AccountProfile {
        id,
        name: text_field(record, "name").unwrap_or_else(|| "Unknown".to_string()),
        email: text_field(record, "email").unwrap_or_default(),
        role,
    })
}

#[async_trait::async_trait]
impl AccountDirectory for StoreAccountDirectory {
    async fn resolve(&self, user_id: Uuid) -> Result<AccountProfile, DirectoryError> {
        let record = self
            .store
            .get(USERS_COLLECTION, &user_id.to_string())
            .await
            .map_err(|e| map_store_error(e, user_id))?;
        profile_from_record(user_id, &record)
    }
}
