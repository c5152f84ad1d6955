//! Token exchange response.

use serde::Deserialize;

/// Body returned by `POST /oauth/v1/token`.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenResponse {
    /// Short-lived credential for API calls.
    pub access_token: String,
    /// Longer-lived credential for obtaining new access tokens. HubSpot
    /// returns one on both grant types, but refresh responses from other
    /// providers may omit it, so it stays optional on the wire.
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// Declared access-token lifetime in seconds.
    pub expires_in: u64,
    /// Token type (usually "bearer").
    #[serde(default)]
    pub token_type: Option<String>,
}
