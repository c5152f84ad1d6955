//! Error Types
//!
//! Error hierarchy for the quickstart app, with mapping from HubSpot error
//! payloads to typed errors.

use thiserror::Error;

/// Root error type for the quickstart.
#[derive(Error, Debug)]
pub enum HubSpotError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
}

impl HubSpotError {
    /// Message suitable for the error page and inline error rendering.
    ///
    /// Provider rejections surface HubSpot's own message string; everything
    /// else gets a short description of the failure.
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(ProviderError::Rejected { message, .. }) => message.clone(),
            Self::Provider(ProviderError::Http { status, .. }) => {
                format!("HubSpot returned HTTP {}", status)
            }
            Self::Network(e) => format!("could not reach HubSpot: {}", e),
            Self::Protocol(e) => format!("unexpected HubSpot response: {}", e),
            Self::Configuration(e) => e.to_string(),
        }
    }
}

/// Configuration error.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("Missing required environment variable: {name}")]
    MissingVar { name: &'static str },

    #[error("Invalid value for environment variable {name}: {value}")]
    InvalidVar { name: &'static str, value: String },

    #[error("No client credentials configured for the {env} environment")]
    MissingCredentials { env: &'static str },

    #[error("Invalid URL in configuration: {url}")]
    InvalidUrl { url: String },
}

/// Network/transport error.
#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("Request failed: {message}")]
    RequestFailed { message: String },

    #[error("Request timed out")]
    Timeout,
}

impl From<reqwest::Error> for HubSpotError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(NetworkError::Timeout)
        } else {
            Self::Network(NetworkError::RequestFailed {
                message: e.to_string(),
            })
        }
    }
}

/// Response parsing error.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    #[error("Contact listing was empty")]
    MissingContact,
}

/// Error reported by HubSpot itself.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// A parsed HubSpot error body (`{"status":"error","message":...}`).
    #[error("{message}")]
    Rejected {
        message: String,
        correlation_id: Option<String>,
    },

    /// Non-2xx response whose body did not carry a HubSpot error payload.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
}

/// HubSpot error response body.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProviderErrorBody {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default, rename = "correlationId")]
    pub correlation_id: Option<String>,
}

/// Map a non-success HTTP response to a typed error.
///
/// HubSpot's OAuth and CRM endpoints both report failures as a JSON body with
/// a `message` field; anything else falls back to the raw status and body.
pub fn error_from_response(status: u16, body: &str) -> HubSpotError {
    if let Ok(parsed) = serde_json::from_str::<ProviderErrorBody>(body) {
        if let Some(message) = parsed.message {
            return HubSpotError::Provider(ProviderError::Rejected {
                message,
                correlation_id: parsed.correlation_id,
            });
        }
    }

    HubSpotError::Provider(ProviderError::Http {
        status,
        body: body.to_string(),
    })
}

/// Result type for quickstart operations.
pub type Result<T> = std::result::Result<T, HubSpotError>;
