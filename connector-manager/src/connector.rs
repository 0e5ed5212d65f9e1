use crate::types::OAuthConfig;
use async_trait::async_trait;
use linkhub::{CredentialRecord, IntegrationItem, Result};
use reqwest::Client;

/// Provider-specific half of an integration.
///
/// A connector knows its provider's OAuth endpoints and how to turn the
/// provider's list endpoint into [`IntegrationItem`]s. Everything else
/// (state tokens, token exchange, persistence) is shared and lives in
/// [`crate::Integration`]. Connectors are stateless.
///
/// # Example
/// ```no_run
/// use async_trait::async_trait;
/// use connector_manager::{ClientAuth, Connector, OAuthConfig};
/// use linkhub::{CredentialRecord, IntegrationItem, Result};
/// use reqwest::Client;
///
/// struct ExampleConnector;
///
/// #[async_trait]
/// impl Connector for ExampleConnector {
///     fn name(&self) -> &str {
///         "example"
///     }
///
///     fn oauth_config(&self) -> OAuthConfig {
///         OAuthConfig {
///             auth_url: "https://example.com/oauth/authorize".to_string(),
///             token_url: "https://example.com/oauth/token".to_string(),
///             scopes: vec!["read".to_string()],
///             extra_params: vec![],
///             client_auth: ClientAuth::RequestBody,
///             pkce: false,
///         }
///     }
///
///     async fn fetch(
///         &self,
///         _http: &Client,
///         _credentials: &CredentialRecord,
///     ) -> Result<Vec<IntegrationItem>> {
///         Ok(vec![IntegrationItem::new("1", Some("First"), "Thing")])
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync {
    /// Returns the unique identifier for this connector.
    ///
    /// Lowercase (e.g., "hubspot", "notion"). Used in API paths,
    /// configuration sections, credential keys and logging.
    fn name(&self) -> &str;

    /// Returns the OAuth configuration for this connector.
    fn oauth_config(&self) -> OAuthConfig;

    /// Fetches one page of items from the provider and normalizes them.
    ///
    /// Issues a single authenticated request using the access token as a
    /// bearer credential. A non-2xx response is an
    /// [`linkhub::IntegrationError::Upstream`] carrying the status and body.
    async fn fetch(
        &self,
        http: &Client,
        credentials: &CredentialRecord,
    ) -> Result<Vec<IntegrationItem>>;
}
