//! OAuth Token Exchange
//!
//! Turns an authorization code or a refresh token into a fresh access/refresh
//! token pair via `POST /oauth/v1/token`, updating both session stores on
//! success. Failures come back as typed provider errors; nothing is stored.

use std::sync::Arc;
use std::time::Duration;

use secrecy::ExposeSecret;
use tracing::{debug, info, warn};

use crate::config::ProviderContext;
use crate::error::{error_from_response, HubSpotError, ProtocolError, Result};
use crate::token::store::{AccessTokenCache, RefreshTokenStore};
use crate::types::TokenResponse;

/// Fraction of the provider-declared lifetime an access token stays cached.
///
/// Expiring the cache entry early keeps a token from being handed out right
/// at the edge of its real lifetime and failing mid-request.
pub const DEFAULT_EARLY_REFRESH_FACTOR: f64 = 0.75;

/// Tunables for the exchange client.
#[derive(Clone, Debug)]
pub struct ExchangeConfig {
    /// Cache TTL as a fraction of `expires_in`.
    pub early_refresh_factor: f64,
}

impl Default for ExchangeConfig {
    fn default() -> Self {
        Self {
            early_refresh_factor: DEFAULT_EARLY_REFRESH_FACTOR,
        }
    }
}

/// Proof presented to the token endpoint.
#[derive(Clone, Debug)]
pub enum GrantProof {
    AuthorizationCode { code: String },
    RefreshToken { refresh_token: String },
}

impl GrantProof {
    pub fn grant_type(&self) -> &'static str {
        match self {
            Self::AuthorizationCode { .. } => "authorization_code",
            Self::RefreshToken { .. } => "refresh_token",
        }
    }
}

/// Client for the two token-granting exchanges.
pub struct TokenExchanger {
    http: reqwest::Client,
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    access_tokens: Arc<dyn AccessTokenCache>,
    config: ExchangeConfig,
}

impl TokenExchanger {
    pub fn new(
        http: reqwest::Client,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access_tokens: Arc<dyn AccessTokenCache>,
    ) -> Self {
        Self::with_config(http, refresh_tokens, access_tokens, ExchangeConfig::default())
    }

    pub fn with_config(
        http: reqwest::Client,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access_tokens: Arc<dyn AccessTokenCache>,
        config: ExchangeConfig,
    ) -> Self {
        Self {
            http,
            refresh_tokens,
            access_tokens,
            config,
        }
    }

    /// Cache TTL derived from a declared token lifetime.
    pub fn cache_ttl(&self, expires_in: u64) -> Duration {
        Duration::from_secs((expires_in as f64 * self.config.early_refresh_factor).round() as u64)
    }

    /// Exchange a grant proof for an access token on behalf of a session.
    ///
    /// On success the refresh token is stored for the session and the access
    /// token is cached with an early-expiry TTL; the access token is
    /// returned. A provider rejection, transport failure, or malformed body
    /// surfaces immediately — no retry, no store mutation.
    pub async fn exchange(
        &self,
        ctx: &ProviderContext,
        session_id: &str,
        proof: GrantProof,
    ) -> Result<String> {
        let grant_type = proof.grant_type();
        debug!(grant_type, env = %ctx.environment, "exchanging proof for tokens");

        let mut form: Vec<(&str, String)> = vec![
            ("grant_type", grant_type.to_string()),
            ("client_id", ctx.credentials.client_id.clone()),
            (
                "client_secret",
                ctx.credentials.client_secret.expose_secret().to_string(),
            ),
            ("redirect_uri", ctx.redirect_uri.to_string()),
        ];
        match &proof {
            GrantProof::AuthorizationCode { code } => form.push(("code", code.clone())),
            GrantProof::RefreshToken { refresh_token } => {
                form.push(("refresh_token", refresh_token.clone()))
            }
        }

        let response = self
            .http
            .post(ctx.token_endpoint())
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), grant_type, "token exchange rejected");
            return Err(error_from_response(status.as_u16(), &body));
        }

        let tokens: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            HubSpotError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        // A response without a refresh token keeps the session's previous one.
        if let Some(refresh_token) = tokens.refresh_token.clone() {
            self.refresh_tokens.set(session_id, refresh_token).await?;
        }
        self.access_tokens
            .put(
                session_id,
                tokens.access_token.clone(),
                self.cache_ttl(tokens.expires_in),
            )
            .await?;

        info!(grant_type, "received an access token and refresh token");
        Ok(tokens.access_token)
    }
}
