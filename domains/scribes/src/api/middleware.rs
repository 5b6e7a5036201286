//! Scribes domain state and auth backend integration

use axum::extract::FromRef;
use eklavya_auth::AuthBackend;

use crate::ScribesRepositories;

/// Application state for the Scribes domain
#[derive(Clone)]
pub struct ScribesState {
    pub repos: ScribesRepositories,
    pub auth: AuthBackend,
}

impl FromRef<ScribesState> for AuthBackend {
    fn from_ref(state: &ScribesState) -> Self {
        state.auth.clone()
    }
}
