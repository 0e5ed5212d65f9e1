//! The uniform OAuth connector lifecycle.
//!
//! Implements the authorization code flow for any [`Connector`]:
//! 1. `begin_authorization` → consent URL with a fresh single-use state
//! 2. User authorizes on the provider's site
//! 3. Provider redirects to the callback with `code` and `state`
//! 4. `complete_authorization` consumes the state, exchanges the code and
//!    persists the credentials
//! 5. `load_credentials` / `fetch_items` use the stored tokens

use crate::connector::Connector;
use crate::exchange::exchange_code_for_token;
use crate::pkce;
use crate::types::{ClientCredentials, OAuthConfig};
use linkhub::{
    CredentialKey, CredentialRecord, CredentialStore, IntegrationError, IntegrationItem, Result,
    StateEntry, StateManager,
};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

#[cfg(test)]
mod tests;

/// Collaborators shared by every integration.
#[derive(Clone)]
pub struct FlowContext {
    pub states: StateManager,
    pub credentials: CredentialStore,
    pub http: Client,
    /// Lifetime of persisted credentials (`None` = until deleted)
    pub credential_ttl: Option<Duration>,
    /// Include the org id in credential keys
    pub org_scoped: bool,
}

/// One registered provider: its connector plus the shared OAuth machinery.
pub struct Integration {
    connector: Arc<dyn Connector>,
    oauth: OAuthConfig,
    client: ClientCredentials,
    ctx: FlowContext,
}

impl Integration {
    pub fn new(connector: Arc<dyn Connector>, client: ClientCredentials, ctx: FlowContext) -> Self {
        let oauth = connector.oauth_config();
        Self {
            connector,
            oauth,
            client,
            ctx,
        }
    }

    /// Overrides the authorize and/or token endpoint (sandboxes, tests).
    pub fn with_endpoints(mut self, auth_url: Option<String>, token_url: Option<String>) -> Self {
        if let Some(url) = auth_url {
            self.oauth.auth_url = url;
        }
        if let Some(url) = token_url {
            self.oauth.token_url = url;
        }
        self
    }

    pub fn name(&self) -> &str {
        self.connector.name()
    }

    pub fn oauth_config(&self) -> &OAuthConfig {
        &self.oauth
    }

    /// Builds the provider consent URL for `(user_id, org_id)`.
    ///
    /// Registers a fresh state token (and PKCE verifier when the provider
    /// requires one) before returning. No network call to the provider.
    pub async fn begin_authorization(&self, user_id: &str, org_id: &str) -> Result<String> {
        require("user_id", user_id)?;
        require("org_id", org_id)?;

        let verifier = self.oauth.pkce.then(pkce::generate_verifier);
        let challenge = verifier.as_deref().map(pkce::challenge_for);

        let state = self
            .ctx
            .states
            .issue(user_id, org_id, self.name(), verifier)
            .await?;

        let url = self.oauth.build_auth_url(
            &self.client.client_id,
            &self.client.redirect_uri,
            &state,
            challenge.as_deref(),
        );

        info!(
            provider = %self.name(),
            user_id = %user_id,
            org_id = %org_id,
            "Authorization started"
        );

        Ok(url)
    }

    /// Completes the flow started by [`Self::begin_authorization`].
    ///
    /// The state is consumed first; an unknown, expired, replayed or
    /// foreign state fails with `InvalidState` before any token request or
    /// store write.
    pub async fn complete_authorization(
        &self,
        code: &str,
        state: &str,
    ) -> Result<(StateEntry, CredentialRecord)> {
        require("code", code)?;

        let entry = self.ctx.states.consume(state).await.map_err(|e| {
            warn!(provider = %self.name(), "Invalid or expired OAuth state");
            e
        })?;

        if entry.provider != self.name() {
            warn!(
                expected = %entry.provider,
                actual = %self.name(),
                "OAuth state issued for another provider"
            );
            return Err(IntegrationError::InvalidState);
        }

        debug!(provider = %self.name(), user_id = %entry.user_id, "CSRF state validated");

        let record = exchange_code_for_token(
            &self.ctx.http,
            &self.oauth,
            &self.client,
            code,
            entry.code_verifier.as_deref(),
        )
        .await
        .map_err(|e| {
            tracing::error!(provider = %self.name(), error = %e, "Token exchange failed");
            e
        })?;

        let key = self.credential_key(&entry.user_id, &entry.org_id);
        self.ctx
            .credentials
            .put(&key, &record, self.ctx.credential_ttl)
            .await?;

        info!(
            provider = %self.name(),
            user_id = %entry.user_id,
            org_id = %entry.org_id,
            has_refresh_token = record.refresh_token.is_some(),
            "OAuth flow completed successfully"
        );

        Ok((entry, record))
    }

    /// Reads the stored credentials for `(user_id, org_id)`.
    pub async fn load_credentials(&self, user_id: &str, org_id: &str) -> Result<CredentialRecord> {
        require("user_id", user_id)?;
        require("org_id", org_id)?;
        self.ctx
            .credentials
            .get(&self.credential_key(user_id, org_id))
            .await
    }

    /// Deletes the stored credentials. Returns `false` if none existed.
    pub async fn revoke_credentials(&self, user_id: &str, org_id: &str) -> Result<bool> {
        require("user_id", user_id)?;
        require("org_id", org_id)?;
        let deleted = self
            .ctx
            .credentials
            .delete(&self.credential_key(user_id, org_id))
            .await?;
        if deleted {
            info!(provider = %self.name(), user_id = %user_id, "Credentials revoked");
        }
        Ok(deleted)
    }

    /// Fetches and normalizes items with the given credentials.
    ///
    /// Credentials without an access token are rejected before any request.
    pub async fn fetch_items(&self, credentials: &CredentialRecord) -> Result<Vec<IntegrationItem>> {
        credentials.validate()?;

        let items = self
            .connector
            .fetch(&self.ctx.http, credentials)
            .await
            .map_err(|e| {
                tracing::error!(provider = %self.name(), error = %e, "Item fetch failed");
                e
            })?;

        debug!(provider = %self.name(), count = items.len(), "Fetched items");
        Ok(items)
    }

    /// Loads stored credentials, then fetches items with them.
    pub async fn load_items(&self, user_id: &str, org_id: &str) -> Result<Vec<IntegrationItem>> {
        let credentials = self.load_credentials(user_id, org_id).await?;
        self.fetch_items(&credentials).await
    }

    fn credential_key(&self, user_id: &str, org_id: &str) -> CredentialKey {
        let key = CredentialKey::new(user_id, self.name());
        if self.ctx.org_scoped {
            key.with_org(org_id)
        } else {
            key
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(IntegrationError::Validation(format!(
            "missing required field '{}'",
            field
        )));
    }
    Ok(())
}
