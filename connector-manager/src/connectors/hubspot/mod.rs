pub mod api;
pub mod config;
pub mod transformer;

use crate::{ClientAuth, Connector, OAuthConfig};
use async_trait::async_trait;
use linkhub::{CredentialRecord, IntegrationItem, Result};
use reqwest::Client;

use self::api::HubSpotClient;
use self::config::{AUTH_URL, BASE_URL, SCOPES, TOKEN_URL};
use self::transformer::contact_to_item;

/// HubSpot connector: CRM contacts as `Contact` items.
pub struct HubSpotConnector {
    base_url: String,
}

impl HubSpotConnector {
    /// Create a connector using the real HubSpot API base URL.
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

impl Default for HubSpotConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for HubSpotConnector {
    fn name(&self) -> &str {
        "hubspot"
    }

    fn oauth_config(&self) -> OAuthConfig {
        OAuthConfig {
            auth_url: AUTH_URL.to_string(),
            token_url: TOKEN_URL.to_string(),
            scopes: SCOPES.iter().map(|s| s.to_string()).collect(),
            extra_params: vec![],
            client_auth: ClientAuth::RequestBody,
            pkce: false,
        }
    }

    async fn fetch(
        &self,
        http: &Client,
        credentials: &CredentialRecord,
    ) -> Result<Vec<IntegrationItem>> {
        let client = HubSpotClient::new(http, &credentials.access_token, &self.base_url);
        let contacts = client.fetch_contacts().await?;

        Ok(contacts
            .iter()
            .filter(|c| !c.id.is_empty())
            .map(contact_to_item)
            .collect())
    }
}
