//! Contacts v1 listing payloads.

use serde::Deserialize;

/// Body returned by `GET /contacts/v1/lists/all/contacts/all`.
#[derive(Clone, Debug, Deserialize)]
pub struct ContactList {
    #[serde(default)]
    pub contacts: Vec<Contact>,
}

/// One contact record. Only the fields the demo renders are modeled; the
/// listing carries many more.
#[derive(Clone, Debug, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub vid: Option<u64>,
    #[serde(default)]
    pub properties: ContactProperties,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct ContactProperties {
    #[serde(default)]
    pub firstname: Option<ContactProperty>,
    #[serde(default)]
    pub lastname: Option<ContactProperty>,
}

/// Contacts v1 wraps each property value in an object.
#[derive(Clone, Debug, Deserialize)]
pub struct ContactProperty {
    pub value: String,
}

impl Contact {
    /// "First Last", tolerating missing name properties.
    pub fn display_name(&self) -> String {
        let first = self
            .properties
            .firstname
            .as_ref()
            .map(|p| p.value.as_str())
            .unwrap_or_default();
        let last = self
            .properties
            .lastname
            .as_ref()
            .map(|p| p.value.as_str())
            .unwrap_or_default();
        format!("{} {}", first, last).trim().to_string()
    }
}
