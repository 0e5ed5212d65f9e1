//! Connector Manager - OAuth integrations for third-party workspaces.
//!
//! This crate defines the interface every provider connector implements and
//! the generic machinery that drives a connector through its lifecycle:
//! authorize, callback, credential lookup and item loading.
//!
//! # Architecture
//!
//! ```text
//!   Frontend (popup / redirect)
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       HTTP API (axum)                    │
//! │  - /integrations/:provider/*             │
//! │  - error → status mapping                │
//! └─────────────────────────────────────────┘
//!          ↓  registry lookup
//! ┌─────────────────────────────────────────┐
//! │       Integration (generic flow)         │
//! │  - state tokens, PKCE                    │
//! │  - token exchange                        │
//! │  - credential store                      │
//! └─────────────────────────────────────────┘
//!          ↓
//!   Connector (HubSpot, Airtable, Notion)
//! ```
//!
//! # Core Types
//!
//! - [`Connector`] - Trait that all connectors must implement
//! - [`OAuthConfig`] - OAuth endpoints, scopes and token-endpoint conventions
//! - [`Integration`] - One connector bound to its client registration
//! - [`ConnectorRegistry`] - Lookup table used by the HTTP layer
//!
//! # Creating a Connector
//!
//! ```no_run
//! use async_trait::async_trait;
//! use connector_manager::{ClientAuth, Connector, OAuthConfig};
//! use linkhub::{CredentialRecord, IntegrationItem, Result};
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     fn name(&self) -> &str {
//!         "myservice"
//!     }
//!
//!     fn oauth_config(&self) -> OAuthConfig {
//!         OAuthConfig {
//!             auth_url: "https://api.example.com/oauth/authorize".to_string(),
//!             token_url: "https://api.example.com/oauth/token".to_string(),
//!             scopes: vec!["read".to_string()],
//!             extra_params: vec![],
//!             client_auth: ClientAuth::RequestBody,
//!             pkce: false,
//!         }
//!     }
//!
//!     async fn fetch(
//!         &self,
//!         _http: &reqwest::Client,
//!         _credentials: &CredentialRecord,
//!     ) -> Result<Vec<IntegrationItem>> {
//!         Ok(vec![])
//!     }
//! }
//! ```

mod connector;
mod types;
pub mod api;
pub mod connectors;
pub mod exchange;
pub mod integration;
pub mod pkce;
pub mod registry;

// Re-export public types
pub use connector::Connector;
pub use integration::{FlowContext, Integration};
pub use registry::ConnectorRegistry;
pub use types::{ClientAuth, ClientCredentials, OAuthConfig};
