pub mod api;
pub mod config;
pub mod transformer;

use crate::{ClientAuth, Connector, OAuthConfig};
use async_trait::async_trait;
use linkhub::{CredentialRecord, IntegrationItem, Result};
use reqwest::Client;

use self::api::AirtableClient;
use self::config::{AUTH_URL, BASE_URL, PAGE_SIZE, SCOPES, TOKEN_URL};
use self::transformer::base_to_item;

/// Airtable connector: accessible bases as `Base` items.
///
/// Airtable requires PKCE and HTTP Basic client authentication.
pub struct AirtableConnector {
    base_url: String,
}

impl AirtableConnector {
    /// Create a connector using the real Airtable API base URL.
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

impl Default for AirtableConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for AirtableConnector {
    fn name(&self) -> &str {
        "airtable"
    }

    fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            extra_params: vec![],
            client_auth: ClientAuth::BasicForm,
            pkce: true,
        }
    }

    async fn fetch(
        &self,
        http: &Client,
        credentials: &CredentialRecord,
    ) -> Result<Vec<IntegrationItem>> {
        let client = AirtableClient::new(http, &credentials.access_token, &self.base_url);
        let bases = client.fetch_bases().await?;

        Ok(bases
            .iter()
            .filter(|b| !b.id.is_empty())
            .take(PAGE_SIZE)
            .map(base_to_item)
            .collect())
    }
}
