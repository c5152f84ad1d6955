//! HTTP Surface
//!
//! The five quickstart routes plus the webhook stub, with a cookie-based
//! session layer feeding an opaque session ID to the token lifecycle.

pub mod routes;
pub mod session;
pub mod views;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::config::EnvironmentState;
use crate::hubspot::ContactsClient;
use crate::token::{
    AccessTokenCache, InMemoryAccessTokenCache, InMemoryRefreshTokenStore, RefreshTokenStore,
    SessionTokenManager, TokenExchanger,
};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub env: Arc<EnvironmentState>,
    pub tokens: Arc<SessionTokenManager>,
    pub contacts: ContactsClient,
}

impl AppState {
    /// Wire up the default in-memory stores.
    pub fn new(env: Arc<EnvironmentState>, http: reqwest::Client) -> Self {
        Self::with_stores(
            env,
            http,
            Arc::new(InMemoryRefreshTokenStore::new()),
            Arc::new(InMemoryAccessTokenCache::new()),
        )
    }

    /// Wire up with injected stores.
    pub fn with_stores(
        env: Arc<EnvironmentState>,
        http: reqwest::Client,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        access_tokens: Arc<dyn AccessTokenCache>,
    ) -> Self {
        let exchanger =
            TokenExchanger::new(http.clone(), refresh_tokens.clone(), access_tokens.clone());
        Self {
            env,
            tokens: Arc::new(SessionTokenManager::new(
                refresh_tokens,
                access_tokens,
                exchanger,
            )),
            contacts: ContactsClient::new(http),
        }
    }
}

/// Assemble the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::home))
        .route("/install", get(routes::install))
        .route("/oauth-callback", get(routes::oauth_callback))
        .route("/env-toggle", get(routes::env_toggle))
        .route("/error", get(routes::error_page))
        .route("/webhook", post(routes::webhook))
        .layer(middleware::from_fn(session::attach_session))
        .with_state(state)
}
