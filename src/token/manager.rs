//! Session Token Manager
//!
//! Resolves a valid access token for a session, refreshing transparently
//! when the cached one has expired.

use std::sync::Arc;

use tracing::info;

use crate::config::ProviderContext;
use crate::error::Result;
use crate::token::exchange::{GrantProof, TokenExchanger};
use crate::token::store::{AccessTokenCache, RefreshTokenStore};

/// Session-scoped access to the token lifecycle.
pub struct SessionTokenManager {
    refresh_tokens: Arc<dyn RefreshTokenStore>,
    access_tokens: Arc<dyn AccessTokenCache>,
    exchanger: TokenExchanger,
}

impl SessionTokenManager {
    pub fn new(
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access_tokens: Arc<dyn AccessTokenCache>,
        exchanger: TokenExchanger,
    ) -> Self {
        Self {
            refresh_tokens,
            access_tokens,
            exchanger,
        }
    }

    /// Complete the code grant for a session (the `/oauth-callback` path).
    pub async fn authorize(
        &self,
        ctx: &ProviderContext,
        session_id: &str,
        code: String,
    ) -> Result<String> {
        self.exchanger
            .exchange(ctx, session_id, GrantProof::AuthorizationCode { code })
            .await
    }

    /// Return a valid access token for the session.
    ///
    /// Cache hit returns the cached token. On a miss, a session that was
    /// never authorized yields `Ok(None)` — a refresh needs a prior refresh
    /// token. Otherwise one refresh exchange runs and its result (or typed
    /// error) is returned. Concurrent refreshes for the same session are
    /// last-writer-wins by design.
    pub async fn access_token(
        &self,
        ctx: &ProviderContext,
        session_id: &str,
    ) -> Result<Option<String>> {
        if let Some(token) = self.access_tokens.get(session_id).await? {
            return Ok(Some(token));
        }

        let Some(refresh_token) = self.refresh_tokens.get(session_id).await? else {
            return Ok(None);
        };

        info!("refreshing expired access token");
        let token = self
            .exchanger
            .exchange(ctx, session_id, GrantProof::RefreshToken { refresh_token })
            .await?;
        Ok(Some(token))
    }

    /// Whether this session ever completed an exchange. Says nothing about
    /// the refresh token still being valid with HubSpot; that is discovered
    /// lazily on the next refresh.
    pub async fn is_authorized(&self, session_id: &str) -> bool {
        self.refresh_tokens
            .contains(session_id)
            .await
            .unwrap_or(false)
    }

    /// The underlying access-token cache (for the expiry sweeper).
    pub fn access_cache(&self) -> Arc<dyn AccessTokenCache> {
        self.access_tokens.clone()
    }
}
