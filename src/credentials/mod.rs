//! Credential records and their persistence.
//!
//! A [`CredentialRecord`] is the token bundle returned by a provider's token
//! endpoint. Records are serialized to JSON, optionally sealed with
//! AES-256-GCM, and kept in the shared key-value store under a
//! [`CredentialKey`].
//!
//! # Usage
//!
//! ```no_run
//! use linkhub::credentials::{CredentialKey, CredentialRecord, CredentialStore};
//! use linkhub::kv::MemoryStore;
//! use std::sync::Arc;
//!
//! # async fn run() -> linkhub::Result<()> {
//! let store = CredentialStore::new(Arc::new(MemoryStore::new()));
//! let key = CredentialKey::new("user1", "hubspot");
//!
//! let record = CredentialRecord::new("access-token");
//! store.put(&key, &record, None).await?;
//!
//! let loaded = store.get(&key).await?;
//! assert_eq!(loaded.access_token, "access-token");
//! # Ok(())
//! # }
//! ```

use crate::error::{IntegrationError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

mod encryption;
mod storage;

pub use storage::CredentialStore;

/// Token bundle granting API access to a connected account.
///
/// The access token is always present; every other token-response field is
/// mirrored into `metadata` as a string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CredentialRecord {
    /// OAuth access token (used for API requests)
    #[serde(default)]
    pub access_token: String,

    /// OAuth refresh token, when the provider issues one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Seconds the access token stays valid after issue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,

    /// Provider-specific fields (workspace, scope, token type, ...)
    #[serde(default, deserialize_with = "lenient_metadata")]
    pub metadata: BTreeMap<String, String>,
}

impl CredentialRecord {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_in: None,
            metadata: BTreeMap::new(),
        }
    }

    /// Builds a record from a raw token endpoint response.
    ///
    /// Fails with [`IntegrationError::TokenExchangeFailed`] when the response
    /// is not an object or carries no non-empty `access_token`.
    pub fn from_token_response(response: &Value) -> Result<Self> {
        let fields = response.as_object().ok_or_else(|| {
            IntegrationError::TokenExchangeFailed("token response is not a JSON object".into())
        })?;

        let access_token = fields
            .get("access_token")
            .and_then(Value::as_str)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| {
                IntegrationError::TokenExchangeFailed(
                    "access token missing from token response".into(),
                )
            })?
            .to_string();

        let refresh_token = fields
            .get("refresh_token")
            .and_then(Value::as_str)
            .map(str::to_string);
        let expires_in = fields.get("expires_in").and_then(Value::as_i64);

        let metadata = fields
            .iter()
            .filter(|(name, _)| name.as_str() != "access_token")
            .filter_map(|(name, value)| metadata_value(value).map(|v| (name.clone(), v)))
            .collect();

        Ok(Self {
            access_token,
            refresh_token,
            expires_in,
            metadata,
        })
    }

    /// Parses a client-supplied serialized record.
    ///
    /// Unparseable input and records without an access token are
    /// validation failures.
    pub fn parse(serialized: &str) -> Result<Self> {
        let record: CredentialRecord = serde_json::from_str(serialized)
            .map_err(|e| IntegrationError::Validation(format!("invalid credentials: {}", e)))?;
        record.validate()?;
        Ok(record)
    }

    /// Checks the access token invariant.
    pub fn validate(&self) -> Result<()> {
        if self.access_token.trim().is_empty() {
            return Err(IntegrationError::Validation(
                "credentials are missing an access token".into(),
            ));
        }
        Ok(())
    }
}

/// Scoped storage key for a credential record.
///
/// Renders as `integration:{user_id}:{provider}`, or
/// `integration:{org_id}:{user_id}:{provider}` once org-scoped. Each segment
/// is percent-encoded, so an id containing `:` cannot alias another key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CredentialKey {
    pub user_id: String,
    pub org_id: Option<String>,
    pub provider: String,
}

impl CredentialKey {
    pub fn new(user_id: impl Into<String>, provider: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            org_id: None,
            provider: provider.into(),
        }
    }

    pub fn with_org(mut self, org_id: impl Into<String>) -> Self {
        self.org_id = Some(org_id.into());
        self
    }
}

impl fmt::Display for CredentialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let user_id = urlencoding::encode(&self.user_id);
        let provider = urlencoding::encode(&self.provider);
        match &self.org_id {
            Some(org_id) => write!(
                f,
                "integration:{}:{}:{}",
                urlencoding::encode(org_id),
                user_id,
                provider
            ),
            None => write!(f, "integration:{}:{}", user_id, provider),
        }
    }
}

/// Renders a JSON value as a metadata string. `null` has no metadata form.
fn metadata_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Accepts metadata maps whose values are any JSON scalar or structure.
fn lenient_metadata<'de, D>(deserializer: D) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .iter()
        .filter_map(|(name, value)| metadata_value(value).map(|v| (name.clone(), v)))
        .collect())
}
