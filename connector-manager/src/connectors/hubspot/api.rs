use super::config::{CONTACT_PROPERTIES, PAGE_SIZE};
use crate::connectors::{ensure_success, http_error};
use linkhub::Result;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;

/// HubSpot CRM contact.
#[derive(Debug, Deserialize)]
pub struct HubSpotContact {
    pub id: String,
    #[serde(default)]
    pub properties: HashMap<String, Option<String>>,
    #[serde(rename = "createdAt", default)]
    pub created_at: Option<String>,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: Option<String>,
}

impl HubSpotContact {
    /// Property value, `None` when absent or null.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(|v| v.as_deref())
    }
}

#[derive(Debug, Deserialize)]
struct ContactsPage {
    #[serde(default)]
    results: Vec<HubSpotContact>,
}

/// HTTP client for the HubSpot CRM v3 API.
pub struct HubSpotClient<'a> {
    http: &'a Client,
    access_token: &'a str,
    base_url: &'a str,
}

impl<'a> HubSpotClient<'a> {
    pub fn new(http: &'a Client, access_token: &'a str, base_url: &'a str) -> Self {
        Self {
            http,
            access_token,
            base_url,
        }
    }

    /// Fetch the first page of contacts.
    pub async fn fetch_contacts(&self) -> Result<Vec<HubSpotContact>> {
        let url = format!("{}/crm/v3/objects/contacts", self.base_url);
        let limit = PAGE_SIZE.to_string();
        let properties = CONTACT_PROPERTIES.join(",");

        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .query(&[("limit", limit.as_str()), ("properties", properties.as_str())])
            .send()
            .await
            .map_err(|e| http_error("Failed to send fetch_contacts request", e))?;

        let page: ContactsPage = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| http_error("Failed to parse contacts response", e))?;

        Ok(page.results)
    }
}
