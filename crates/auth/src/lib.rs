//! Authentication middleware for the Eklavya API
//!
//! Validates bearer tokens issued by the external identity provider, resolves
//! the subject through the Account Directory and exposes the result as an
//! axum extractor usable with any state implementing `FromRef<S>` for
//! `AuthBackend`.

mod backend;
mod claims;
mod config;
mod context;
mod error;
mod extractors;
mod jwt;

pub use backend::AuthBackend;
pub use claims::IdentityClaims;
pub use config::AuthConfig;
pub use context::AuthContext;
pub use error::AuthError;
pub use extractors::AuthUser;
