//! In-memory account directory for tests and local development

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::{AccountDirectory, AccountProfile, DirectoryError, Role};

#[derive(Debug, Clone, Default)]
pub struct MockAccountDirectory {
    accounts: Arc<Mutex<HashMap<Uuid, AccountProfile>>>,
}

impl MockAccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an account
    pub fn insert(&self, profile: AccountProfile) {
        self.accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(profile.id, profile);
    }

    /// Create an account with a fresh id and return its profile
    pub fn add(&self, name: &str, role: Role) -> AccountProfile {
        let profile = AccountProfile::new(
            Uuid::new_v4(),
            name,
            format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
            role,
        );
        self.insert(profile.clone());
        profile
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait::async_trait]
impl AccountDirectory for MockAccountDirectory {
    async fn resolve(&self, user_id: Uuid) -> Result<AccountProfile, DirectoryError> {
        let found = self
            .accounts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(&user_id)
            .cloned();
        match found {
            Some(profile) => Ok(profile),
            None => {
                tracing::debug!(user_id = %user_id, "Mock directory has no such account");
                Err(DirectoryError::NotFound(user_id))
            }
        }
    }
}
