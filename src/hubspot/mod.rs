//! Provider API Client
//!
//! The one illustrative CRM call: fetch the first contact of the authorized
//! account from the contacts v1 listing endpoint.

use tracing::{debug, warn};

use crate::config::ProviderContext;
use crate::error::{error_from_response, HubSpotError, ProtocolError, Result};
use crate::types::{Contact, ContactList};

/// Read-only client for the contacts listing.
#[derive(Clone)]
pub struct ContactsClient {
    http: reqwest::Client,
}

impl ContactsClient {
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// Fetch the first contact visible to the access token.
    pub async fn first_contact(
        &self,
        ctx: &ProviderContext,
        access_token: &str,
    ) -> Result<Contact> {
        let mut url = ctx
            .api_base
            .join("/contacts/v1/lists/all/contacts/all")
            .expect("api base accepts a path");
        url.query_pairs_mut().append_pair("count", "1");

        debug!(env = %ctx.environment, "retrieving a contact");
        let response = self
            .http
            .get(url)
            .bearer_auth(access_token)
            .header("content-type", "application/json")
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "unable to retrieve contact");
            return Err(error_from_response(status.as_u16(), &body));
        }

        let list: ContactList = serde_json::from_str(&body).map_err(|e| {
            HubSpotError::Protocol(ProtocolError::InvalidJson {
                message: e.to_string(),
            })
        })?;

        list.contacts
            .into_iter()
            .next()
            .ok_or(HubSpotError::Protocol(ProtocolError::MissingContact))
    }
}
