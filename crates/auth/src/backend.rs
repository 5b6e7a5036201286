//! Concrete authentication backend
//!
//! Pairs the token settings with the Account Directory used to resolve the
//! token subject.

use std::sync::Arc;

use eklavya_directory::{AccountDirectory, DirectoryError};
use uuid::Uuid;

use crate::config::AuthConfig;
use crate::context::AuthContext;
use crate::error::AuthError;

/// Domain states expose this via `FromRef`:
/// ```ignore
/// impl FromRef<MyDomainState> for AuthBackend {
///     fn from_ref(state: &MyDomainState) -> Self {
///         state.auth.clone()
///     }
/// }
/// ```
#[derive(Clone)]
pub struct AuthBackend {
    directory: Arc<dyn AccountDirectory>,
    config: AuthConfig,
}

impl AuthBackend {
    pub fn new(directory: Arc<dyn AccountDirectory>, config: AuthConfig) -> Self {
        Self { directory, config }
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn directory(&self) -> Arc<dyn AccountDirectory> {
        Arc::clone(&self.directory)
    }

    /// Validate a bearer token and resolve its subject
    pub(crate) async fn authenticate_jwt(&self, token: &str) -> Result<AuthContext, AuthError> {
        let claims = crate::jwt::validate_jwt_token(token, &self.config)?;

        let user_id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidUserId)?;

        let account = self.directory.resolve(user_id).await.map_err(|e| match e {
            DirectoryError::NotFound(_) => {
                tracing::debug!(user_id = %user_id, "Token subject not in directory");
                AuthError::UserNotFound
            }
            DirectoryError::Unavailable(msg) => {
                tracing::error!(error = %msg, user_id = %user_id, "Directory unavailable");
                AuthError::DirectoryUnavailable
            }
            DirectoryError::InvalidData(msg) => {
                tracing::error!(error = %msg, user_id = %user_id, "Failed to load account");
                AuthError::UserLoadError
            }
        })?;

        Ok(AuthContext::new(account))
    }
}
