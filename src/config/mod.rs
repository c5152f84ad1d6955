//! Configuration
//!
//! Environment-variable configuration, per-environment credentials and
//! provider URLs, and the runtime QA/PROD selector.
//!
//! The selector hands out immutable [`ProviderContext`] snapshots: every
//! request reads one coherent {environment, credentials, URLs} triple, and a
//! toggle builds a complete replacement snapshot before swapping it in.

use std::env;
use std::sync::{Arc, RwLock};

use secrecy::SecretString;
use serde::Serialize;
use url::Url;

use crate::error::ConfigurationError;

/// PROD authorization host.
pub const PROD_APP_BASE: &str = "https://app.hubspot.com";
/// PROD API host.
pub const PROD_API_BASE: &str = "https://api.hubapi.com";
/// QA authorization host.
pub const QA_APP_BASE: &str = "https://app.hubspotqa.com";
/// QA API host.
pub const QA_API_BASE: &str = "https://api.hubapiqa.com";

/// Default scope requested when `SCOPE` is not set.
pub const DEFAULT_SCOPE: &str = "contacts";

/// Default listen port.
pub const DEFAULT_PORT: u16 = 80;

/// HubSpot environment selector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Environment {
    Qa,
    Prod,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Qa => "QA",
            Self::Prod => "PROD",
        }
    }

    /// The other environment.
    pub fn toggled(&self) -> Self {
        match self {
            Self::Qa => Self::Prod,
            Self::Prod => Self::Qa,
        }
    }

    /// Parse `HUBSPOT_ENV` the way the app always has: anything that is not
    /// QA (case-insensitive) selects PROD.
    pub fn from_flag(value: &str) -> Self {
        if value.eq_ignore_ascii_case("QA") {
            Self::Qa
        } else {
            Self::Prod
        }
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// OAuth app credentials for one environment.
#[derive(Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: SecretString,
}

impl std::fmt::Debug for ClientCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .finish()
    }
}

/// Provider base URLs for one environment.
#[derive(Clone, Debug)]
pub struct ProviderBaseUrls {
    /// Host serving the user-facing consent page.
    pub app: Url,
    /// Host serving the OAuth token and CRM endpoints.
    pub api: Url,
}

impl ProviderBaseUrls {
    fn parse(app: &str, api: &str) -> Result<Self, ConfigurationError> {
        Ok(Self {
            app: parse_url(app)?,
            api: parse_url(api)?,
        })
    }
}

fn parse_url(value: &str) -> Result<Url, ConfigurationError> {
    Url::parse(value).map_err(|_| ConfigurationError::InvalidUrl {
        url: value.to_string(),
    })
}

/// Static application configuration, loaded once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Environment selected at startup.
    pub environment: Environment,
    pub prod_credentials: ClientCredentials,
    pub qa_credentials: Option<ClientCredentials>,
    /// Scopes requested during authorization.
    pub scopes: Vec<String>,
    /// Public base URL of this app, used to build the redirect URI.
    pub app_base_url: Url,
    pub port: u16,
    pub prod_urls: ProviderBaseUrls,
    pub qa_urls: ProviderBaseUrls,
}

impl AppConfig {
    /// Load configuration from the process environment.
    ///
    /// Fails if the PROD credential pair is absent, if `PORT` or any URL is
    /// malformed, or if a non-LOCALHOST deployment omits `APP_BASE_URL`.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let environment = Environment::from_flag(&env::var("HUBSPOT_ENV").unwrap_or_default());

        let prod_credentials = ClientCredentials {
            client_id: require_var("CLIENT_ID_PROD")?,
            client_secret: SecretString::new(require_var("CLIENT_SECRET_PROD")?),
        };

        let qa_credentials = match (env::var("CLIENT_ID_QA"), env::var("CLIENT_SECRET_QA")) {
            (Ok(client_id), Ok(secret)) => Some(ClientCredentials {
                client_id,
                client_secret: SecretString::new(secret),
            }),
            _ => None,
        };

        let scopes = env::var("SCOPE")
            .map(|raw| parse_scopes(&raw))
            .unwrap_or_else(|_| vec![DEFAULT_SCOPE.to_string()]);

        let port = match env::var("PORT") {
            Ok(raw) => raw
                .parse::<u16>()
                .map_err(|_| ConfigurationError::InvalidVar {
                    name: "PORT",
                    value: raw,
                })?,
            Err(_) => DEFAULT_PORT,
        };

        let node_env = env::var("NODE_ENV").unwrap_or_default();
        let app_base_url = if node_env.eq_ignore_ascii_case("LOCALHOST") {
            parse_url(&format!("http://localhost:{}", port))?
        } else {
            parse_url(&require_var("APP_BASE_URL")?)?
        };

        Ok(Self {
            environment,
            prod_credentials,
            qa_credentials,
            scopes,
            app_base_url,
            port,
            prod_urls: ProviderBaseUrls::parse(PROD_APP_BASE, PROD_API_BASE)?,
            qa_urls: ProviderBaseUrls::parse(QA_APP_BASE, QA_API_BASE)?,
        })
    }

    /// Resolve the credential pair for an environment.
    pub fn credentials(&self, env: Environment) -> Result<&ClientCredentials, ConfigurationError> {
        match env {
            Environment::Prod => Ok(&self.prod_credentials),
            Environment::Qa => {
                self.qa_credentials
                    .as_ref()
                    .ok_or(ConfigurationError::MissingCredentials { env: "QA" })
            }
        }
    }

    /// Provider base URLs for an environment.
    pub fn base_urls(&self, env: Environment) -> &ProviderBaseUrls {
        match env {
            Environment::Prod => &self.prod_urls,
            Environment::Qa => &self.qa_urls,
        }
    }

    /// Where HubSpot sends the user after the consent page.
    pub fn redirect_uri(&self) -> Result<Url, ConfigurationError> {
        self.app_base_url
            .join("/oauth-callback")
            .map_err(|_| ConfigurationError::InvalidUrl {
                url: self.app_base_url.to_string(),
            })
    }
}

fn require_var(name: &'static str) -> Result<String, ConfigurationError> {
    env::var(name)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(ConfigurationError::MissingVar { name })
}

/// Split `SCOPE` on spaces, commas, or literal `%20` separators.
fn parse_scopes(raw: &str) -> Vec<String> {
    raw.replace("%20", " ")
        .split([' ', ','])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

/// One coherent view of the active environment: selector, credentials, and
/// URLs, all resolved from the same toggle.
#[derive(Clone, Debug)]
pub struct ProviderContext {
    pub environment: Environment,
    pub credentials: ClientCredentials,
    /// Fully assembled consent-page URL users are redirected to on install.
    pub authorize_url: Url,
    pub api_base: Url,
    pub redirect_uri: Url,
}

impl ProviderContext {
    fn build(config: &AppConfig, env: Environment) -> Result<Self, ConfigurationError> {
        let credentials = config.credentials(env)?.clone();
        let bases = config.base_urls(env);
        let redirect_uri = config.redirect_uri()?;

        let mut authorize_url =
            bases
                .app
                .join("/oauth/authorize")
                .map_err(|_| ConfigurationError::InvalidUrl {
                    url: bases.app.to_string(),
                })?;
        authorize_url
            .query_pairs_mut()
            .append_pair("client_id", &credentials.client_id)
            .append_pair("scope", &config.scopes.join(" "))
            .append_pair("redirect_uri", redirect_uri.as_str());

        Ok(Self {
            environment: env,
            credentials,
            authorize_url,
            api_base: bases.api.clone(),
            redirect_uri,
        })
    }

    /// Token exchange endpoint for this environment.
    pub fn token_endpoint(&self) -> Url {
        self.api_base
            .join("/oauth/v1/token")
            .expect("api base accepts a path")
    }
}

/// Runtime environment selector.
///
/// Holds the loaded [`AppConfig`] and the current [`ProviderContext`]
/// snapshot. Toggling regenerates credentials and URLs together; requests
/// that already hold a snapshot keep a consistent view.
pub struct EnvironmentState {
    config: AppConfig,
    current: RwLock<Arc<ProviderContext>>,
}

impl EnvironmentState {
    /// Build the initial snapshot for the configured environment.
    ///
    /// Fails if the active environment has no credentials, so the app never
    /// starts in an unusable state.
    pub fn new(config: AppConfig) -> Result<Self, ConfigurationError> {
        let initial = ProviderContext::build(&config, config.environment)?;
        Ok(Self {
            config,
            current: RwLock::new(Arc::new(initial)),
        })
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<ProviderContext> {
        self.current.read().expect("selector lock poisoned").clone()
    }

    /// Flip QA <-> PROD.
    ///
    /// The replacement snapshot is built before the swap; if the target
    /// environment has no credentials the selector is left unchanged.
    pub fn toggle(&self) -> Result<Arc<ProviderContext>, ConfigurationError> {
        let next_env = self.snapshot().environment.toggled();
        let next = Arc::new(ProviderContext::build(&self.config, next_env)?);
        *self.current.write().expect("selector lock poisoned") = next.clone();
        Ok(next)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
