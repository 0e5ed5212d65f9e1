use super::config::{NOTION_VERSION, PAGE_SIZE};
use crate::connectors::{ensure_success, http_error};
use linkhub::Result;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Rich text fragment; only the plain text is used.
#[derive(Debug, Deserialize)]
pub struct RichText {
    #[serde(default)]
    pub plain_text: String,
}

/// Page or database returned by Notion search.
#[derive(Debug, Deserialize)]
pub struct NotionObject {
    /// "page" or "database"
    pub object: String,
    pub id: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created_time: Option<String>,
    #[serde(default)]
    pub last_edited_time: Option<String>,
    #[serde(default)]
    pub archived: bool,
    #[serde(default)]
    pub parent: Option<Map<String, Value>>,
    /// Page properties; the one with `"type": "title"` holds the name
    #[serde(default)]
    pub properties: Map<String, Value>,
    /// Database title
    #[serde(default)]
    pub title: Vec<RichText>,
}

#[derive(Debug, Deserialize)]
struct SearchResults {
    #[serde(default)]
    results: Vec<NotionObject>,
}

/// HTTP client for the Notion public API.
pub struct NotionClient<'a> {
    http: &'a Client,
    access_token: &'a str,
    base_url: &'a str,
}

impl<'a> NotionClient<'a> {
    pub fn new(http: &'a Client, access_token: &'a str, base_url: &'a str) -> Self {
        Self {
            http,
            access_token,
            base_url,
        }
    }

    /// Search everything shared with the integration (first page).
    ///
    /// Notion exposes listing only through `POST /v1/search`.
    pub async fn search(&self) -> Result<Vec<NotionObject>> {
        let url = format!("{}/v1/search", self.base_url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.access_token)
            .header("Notion-Version", NOTION_VERSION)
            .json(&serde_json::json!({ "page_size": PAGE_SIZE }))
            .send()
            .await
            .map_err(|e| http_error("Failed to send search request", e))?;

        let results: SearchResults = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(|e| http_error("Failed to parse search response", e))?;

        Ok(results.results)
    }
}
