use crate::connectors::{ensure_success, http_error};
use linkhub::Result;
use reqwest::Client;
use serde::Deserialize;

/// Airtable base, as listed by the metadata API.
#[derive(Debug, Deserialize)]
pub struct AirtableBase {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "permissionLevel", default)]
    pub permission_level: Option<String>,
}

#[derive(Debug, Deserialize)]
struct BasesPage {
    #[serde(default)]
    bases: Vec<AirtableBase>,
}

/// HTTP client for the Airtable metadata API.
pub struct AirtableClient<'a> {
    http: &'a Client,
    access_token: &'a str,
    base_url: &'a str,
}

impl<'a> AirtableClient<'a> {
    pub fn new(http: &'a Client, access_token: &'a str, base_url: &'a str) -> Self {
        Self {
            http,
            access_token,
            base_url,
        }
    }

    /// Fetch the first page of bases the token can access.
    pub async fn fetch_bases(&self) -> Result<Vec<AirtableBase>> {
        let url = format!("{}/v0/meta/bases", self.base_url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.access_token)
            .send()
            .await
            .map_err(|e| http_error("Failed to send fetch_bases request", e))?;

        let page: BasesPage = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| http_error("Failed to parse bases response", e))?;

        Ok(page.bases)
    }
}
