use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use hubspot_quickstart::{router, AppConfig, AppState, EnvironmentState};

/// How often expired access-token cache entries are swept out.
const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Outbound HTTP timeout for token exchanges and API calls.
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().context("loading configuration")?;
    let app_base_url = config.app_base_url.clone();
    let port = config.port;

    let env = Arc::new(EnvironmentState::new(config).context("resolving initial environment")?);
    info!(env = %env.snapshot().environment, "active HubSpot environment");

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .context("building HTTP client")?;
    let state = AppState::new(env, http);

    // The in-memory cache drops expired entries on read; this sweep keeps
    // abandoned sessions from accumulating dead entries.
    let cache = state.tokens.access_cache();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            if let Ok(purged) = cache.purge_expired().await {
                if purged > 0 {
                    info!(purged, "purged expired access tokens");
                }
            }
        }
    });

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("binding 0.0.0.0:{}", port))?;
    info!(%app_base_url, "starting app");

    if let Err(e) = webbrowser::open(app_base_url.as_str()) {
        warn!(error = %e, "could not open a browser; visit the app URL manually");
    }

    axum::serve(listener, router(state))
        .await
        .context("serving HTTP")?;
    Ok(())
}
