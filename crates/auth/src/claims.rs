//! JWT claims types

use serde::{Deserialize, Serialize};

/// Claims carried by identity-provider access tokens
#[derive(Debug, Serialize, Deserialize)]
pub struct IdentityClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Email
    #[serde(default)]
    pub email: Option<String>,
    /// Issued at
    pub iat: u64,
    /// Expires at
    pub exp: u64,
    /// Audience
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    /// Issuer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,
}
