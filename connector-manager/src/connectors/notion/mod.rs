pub mod api;
pub mod config;
pub mod transformer;

use crate::{ClientAuth, Connector, OAuthConfig};
use async_trait::async_trait;
use linkhub::{CredentialRecord, IntegrationItem, Result};
use reqwest::Client;

use self::api::NotionClient;
use self::config::{AUTH_URL, BASE_URL, TOKEN_URL};
use self::transformer::object_to_item;

/// Notion connector: shared pages and databases.
///
/// Notion has no OAuth scopes; access is whatever the user shares with the
/// integration on the consent screen.
pub struct NotionConnector {
    base_url: String,
}

impl NotionConnector {
    /// Create a connector using the real Notion API base URL.
    pub fn new() -> Self {
        Self {
            base_url: BASE_URL.to_string(),
        }
    }

    /// Create a connector with a custom API base URL (for testing).
    pub fn with_base_url(base_url: String) -> Self {
        Self { base_url }
    }
}

impl Default for NotionConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for NotionConnector {
    fn name(&self) -> &str {
        "notion"
    }

    fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scopes: vec![],
            extra_params: vec![("owner".to_string(), "user".to_string())],
            client_auth: ClientAuth::BasicJson,
            pkce: false,
        }
    }

    async fn fetch(
        &self,
        http: &Client,
        credentials: &CredentialRecord,
    ) -> Result<Vec<IntegrationItem>> {
        let client = NotionClient::new(http, &credentials.access_token, &self.base_url);
        let objects = client.search().await?;

        Ok(objects
            .iter()
            .filter(|o| !o.id.is_empty() && !o.archived)
            .map(object_to_item)
            .collect())
    }
}
