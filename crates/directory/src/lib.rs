//! Eklavya Account Directory
//!
//! Resolves an account id to its role, display name and contact address.
//! Provides:
//! - A store-backed directory over the `users` collection
//! - A mock directory for tests and local development

use std::fmt;

use eklavya_common::Error;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod mock;
pub mod store;

pub use mock::MockAccountDirectory;
pub use store::StoreAccountDirectory;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirectoryError {
    #[error("Account not found: {0}")]
    NotFound(Uuid),

    #[error("Account directory unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid account record: {0}")]
    InvalidData(String),
}

impl From<DirectoryError> for Error {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::NotFound(_) => Error::NotFound("Account not found".to_string()),
            DirectoryError::Unavailable(_) => Error::StoreUnavailable,
            DirectoryError::InvalidData(msg) => Error::Internal(msg),
        }
    }
}

/// Account role. Fixed once the account exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Scribe,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Student => write!(f, "student"),
            Role::Scribe => write!(f, "scribe"),
        }
    }
}

/// Directory entry for one account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl AccountProfile {
    pub fn new(id: Uuid, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            role,
        }
    }

    /// The identity this account acts as
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id,
            role: self.role,
        }
    }
}

/// The authenticated party behind an operation, passed explicitly to every
/// booking operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    pub id: Uuid,
    pub role: Role,
}

impl Actor {
    pub fn student(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Student,
        }
    }

    pub fn scribe(id: Uuid) -> Self {
        Self {
            id,
            role: Role::Scribe,
        }
    }
}

/// Account Directory collaborator
#[async_trait::async_trait]
pub trait AccountDirectory: Send + Sync {
    /// Resolve an account id to its profile
    async fn resolve(&self, user_id: Uuid) -> Result<AccountProfile, DirectoryError>;
}
