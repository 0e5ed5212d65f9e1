//! Connector registry - lookup table of configured integrations.
//!
//! The HTTP layer never branches on provider identity beyond a lookup here.

use crate::connectors::airtable::AirtableConnector;
use crate::connectors::hubspot::HubSpotConnector;
use crate::connectors::notion::NotionConnector;
use crate::integration::{FlowContext, Integration};
use crate::types::ClientCredentials;
use crate::Connector;
use linkhub::config::HubConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Names of the built-in connectors
pub const AVAILABLE_CONNECTORS: &[&str] = &["hubspot", "airtable", "notion"];

/// Returns all built-in connectors, honouring API base URL overrides.
pub fn get_all_connectors(config: &HubConfig) -> Vec<Arc<dyn Connector>> {
    let base_url = |name: &str| {
        config
            .providers
            .get(name)
            .and_then(|p| p.api_base_url.clone())
    };

    let hubspot: Arc<dyn Connector> = Arc::new(
        base_url("hubspot")
            .map(HubSpotConnector::with_base_url)
            .unwrap_or_default(),
    );
    let airtable: Arc<dyn Connector> = Arc::new(
        base_url("airtable")
            .map(AirtableConnector::with_base_url)
            .unwrap_or_default(),
    );
    let notion: Arc<dyn Connector> = Arc::new(
        base_url("notion")
            .map(NotionConnector::with_base_url)
            .unwrap_or_default(),
    );

    vec![hubspot, airtable, notion]
}

/// Integrations keyed by provider name.
#[derive(Default)]
pub struct ConnectorRegistry {
    integrations: BTreeMap<String, Arc<Integration>>,
}

impl ConnectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every built-in connector that has client credentials configured.
    pub fn from_config(config: &HubConfig, ctx: FlowContext) -> Self {
        let mut registry = Self::new();

        for connector in get_all_connectors(config) {
            let name = connector.name().to_string();
            let Some(provider) = config.provider(&name) else {
                warn!(
                    provider = %name,
                    "OAuth not configured (set {}_CLIENT_ID and {}_CLIENT_SECRET); connector disabled",
                    name.to_uppercase(),
                    name.to_uppercase()
                );
                continue;
            };

            let client = ClientCredentials {
                client_id: provider.client_id.clone(),
                client_secret: provider.client_secret.clone(),
                redirect_uri: config.redirect_uri(&name),
            };

            let integration = Integration::new(connector, client, ctx.clone())
                .with_endpoints(provider.auth_url.clone(), provider.token_url.clone());
            registry.register(integration);
        }

        info!(providers = ?registry.names(), "Connector registry initialized");
        registry
    }

    pub fn register(&mut self, integration: Integration) {
        self.integrations
            .insert(integration.name().to_string(), Arc::new(integration));
    }

    pub fn get(&self, name: &str) -> Option<Arc<Integration>> {
        self.integrations.get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.integrations.keys().cloned().collect()
    }
}
