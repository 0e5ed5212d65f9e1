//! OAuth state management for CSRF protection.
//!
//! Manages the one-time state tokens that tie an authorization redirect to
//! its callback. Entries live in the shared key-value store so any API
//! instance can complete a flow started by another.

use crate::error::{IntegrationError, Result};
use crate::kv::KeyValueStore;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::sync::Arc;


/// Key prefix for pending states in the key-value store
const STATE_KEY_PREFIX: &str = "oauth_state:";

/// Random bytes per state token (256 bits)
const STATE_TOKEN_BYTES: usize = 32;

/// Default lifetime of a pending state (10 minutes)
pub const DEFAULT_STATE_TTL_SECONDS: i64 = 600;

/// Pending authorization flow bound to a state token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StateEntry {
    pub user_id: String,
    pub org_id: String,
    pub provider: String,
    /// PKCE verifier for providers that require one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_verifier: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Issues and consumes single-use state tokens.
#[derive(Clone)]
pub struct StateManager {
    store: Arc<dyn KeyValueStore>,
    expiry_duration: Duration,
}

impl StateManager {
    /// Create a new state manager
    ///
    /// # Arguments
    /// * `store` - Shared key-value store holding pending states
    /// * `expiry_seconds` - How long states remain valid (default: 600 = 10 minutes)
    pub fn new(store: Arc<dyn KeyValueStore>, expiry_seconds: i64) -> Self {
        Self {
            store,
            expiry_duration: Duration::seconds(expiry_seconds.max(1)),
        }
    }

    /// Generate a new state token bound to `(user_id, org_id, provider)` and store it
    pub async fn issue(
        &self,
        user_id: &str,
        org_id: &str,
        provider: &str,
        code_verifier: Option<String>,
    ) -> Result<String> {
        let token = generate_token(STATE_TOKEN_BYTES);
        let entry = StateEntry {
            user_id: user_id.to_string(),
            org_id: org_id.to_string(),
            provider: provider.to_string(),
            code_verifier,
            created_at: Utc::now(),
        };

        let value = serde_json::to_string(&entry)
            .map_err(|e| IntegrationError::Store(format!("failed to encode state: {}", e)))?;
        let ttl = self
            .expiry_duration
            .to_std()
            .map_err(|e| IntegrationError::Store(e.to_string()))?;

        self.store
            .set(&state_key(&token), &value, Some(ttl))
            .await?;

        tracing::debug!(provider = %provider, user_id = %user_id, "Issued OAuth state");
        Ok(token)
    }

    /// Validate and consume a state token
    ///
    /// The entry is removed atomically before validation, so a token can be
    /// consumed at most once. Unknown, replayed and expired tokens all fail
    /// with [`IntegrationError::InvalidState`].
    pub async fn consume(&self, token: &str) -> Result<StateEntry> {
        if token.is_empty() {
            return Err(IntegrationError::InvalidState);
        }

        let value = self
            .store
            .take(&state_key(token))
            .await?
            .ok_or(IntegrationError::InvalidState)?;

        let entry: StateEntry = serde_json::from_str(&value).map_err(|e| {
            tracing::warn!(error = %e, "Discarding unreadable OAuth state entry");
            IntegrationError::InvalidState
        })?;

        // Backends may evict lazily; the timestamp is authoritative.
        if Utc::now() - entry.created_at > self.expiry_duration {
            return Err(IntegrationError::InvalidState);
        }

        Ok(entry)
    }
}

fn state_key(token: &str) -> String {
    format!("{}{}", STATE_KEY_PREFIX, token)
}

/// Generates a URL-safe random token from `num_bytes` of CSPRNG output.
pub fn generate_token(num_bytes: usize) -> String {
    let mut bytes = vec![0u8; num_bytes];
    rand::thread_rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
