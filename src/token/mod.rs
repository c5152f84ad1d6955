//! Token Lifecycle
//!
//! Session-keyed token state and the exchanges that feed it:
//!
//! - **Stores**: injected abstractions for the process-lifetime refresh-token
//!   map and the expiring access-token cache
//! - **Exchange**: the two grant flows against `POST /oauth/v1/token`
//! - **Manager**: session-scoped access-token resolution with transparent
//!   refresh

pub mod exchange;
pub mod manager;
pub mod store;

pub use exchange::{
    ExchangeConfig, GrantProof, TokenExchanger, DEFAULT_EARLY_REFRESH_FACTOR,
};
pub use manager::SessionTokenManager;
pub use store::{
    AccessTokenCache, InMemoryAccessTokenCache, InMemoryRefreshTokenStore, RefreshTokenStore,
};
