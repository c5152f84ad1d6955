//! HubSpot OAuth2 Quickstart
//!
//! A minimal demonstration of the OAuth2 authorization-code flow against
//! HubSpot: redirect the user to the consent page, exchange the returned
//! code for an access/refresh token pair, cache the access token with an
//! early-expiry margin, and use it for one read-only CRM call. A toggle
//! endpoint flips between the QA and PROD HubSpot environments at runtime.
//!
//! # Architecture
//!
//! - `config`: environment-variable configuration, per-environment
//!   credentials and URLs, and the atomically swapped QA/PROD selector
//! - `error`: typed error hierarchy with HubSpot error-payload mapping
//! - `types`: wire payloads (token responses, contact listings)
//! - `token`: session-keyed token stores, the two grant exchanges, and the
//!   session-scoped access-token accessor
//! - `hubspot`: the illustrative contacts API call
//! - `server`: axum routes, session cookie layer, and HTML views

pub mod config;
pub mod error;
pub mod hubspot;
pub mod server;
pub mod token;
pub mod types;

// Re-export configuration
pub use config::{
    AppConfig, ClientCredentials, Environment, EnvironmentState, ProviderBaseUrls,
    ProviderContext,
};

// Re-export errors
pub use error::{
    error_from_response, ConfigurationError, HubSpotError, NetworkError, ProtocolError,
    ProviderError, ProviderErrorBody, Result,
};

// Re-export token lifecycle
pub use token::{
    AccessTokenCache, ExchangeConfig, GrantProof, InMemoryAccessTokenCache,
    InMemoryRefreshTokenStore, RefreshTokenStore, SessionTokenManager, TokenExchanger,
    DEFAULT_EARLY_REFRESH_FACTOR,
};

// Re-export API client and types
pub use hubspot::ContactsClient;
pub use types::{Contact, ContactList, TokenResponse};

// Re-export HTTP surface
pub use server::{router, AppState};
