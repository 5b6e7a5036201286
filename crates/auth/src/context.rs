//! Authorization context for authenticated accounts

use eklavya_directory::{AccountProfile, Actor, Role};

/// The account behind an authenticated request
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub account: AccountProfile,
}

impl AuthContext {
    pub fn new(account: AccountProfile) -> Self {
        Self { account }
    }

    /// Identity passed to booking operations
    pub fn actor(&self) -> Actor {
        self.account.actor()
    }

    pub fn is_student(&self) -> bool {
        self.account.role == Role::Student
    }

    pub fn is_scribe(&self) -> bool {
        self.account.role == Role::Scribe
    }
}
