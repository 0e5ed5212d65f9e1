//! Credential persistence over the key-value store.

use super::{encryption, CredentialKey, CredentialRecord};
use crate::error::{IntegrationError, Result};
use crate::kv::KeyValueStore;
use anyhow::Context;
use std::sync::Arc;
use std::time::Duration;

/// Serialized credential storage with optional encryption at rest.
///
/// Writes are last-write-wins; there is no merging with a previous record.
#[derive(Clone)]
pub struct CredentialStore {
    store: Arc<dyn KeyValueStore>,
    encryption_key: Option<Vec<u8>>,
}

impl CredentialStore {
    /// Creates a store that keeps records as plain JSON.
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            encryption_key: None,
        }
    }

    /// Seals every record with the given base64 32-byte master key.
    pub fn with_encryption(mut self, encryption_key: &str) -> anyhow::Result<Self> {
        let key = encryption::validate_key(encryption_key).context("Invalid encryption key")?;
        self.encryption_key = Some(key);
        Ok(self)
    }

    /// Stores `record` under `key`, replacing any previous record.
    ///
    /// A record without an access token is rejected and nothing is written.
    pub async fn put(
        &self,
        key: &CredentialKey,
        record: &CredentialRecord,
        ttl: Option<Duration>,
    ) -> Result<()> {
        record.validate()?;

        let json = serde_json::to_string(record)
            .map_err(|e| IntegrationError::Store(format!("failed to encode credentials: {}", e)))?;

        let value = match &self.encryption_key {
            Some(master) => encryption::seal(&json, master)
                .map_err(|e| IntegrationError::Store(format!("{:#}", e)))?,
            None => json,
        };

        self.store.set(&key.to_string(), &value, ttl).await?;
        tracing::debug!(key = %key, encrypted = self.encryption_key.is_some(), "Stored credentials");
        Ok(())
    }

    /// Loads the record stored under `key`.
    pub async fn get(&self, key: &CredentialKey) -> Result<CredentialRecord> {
        let value = self
            .store
            .get(&key.to_string())
            .await?
            .ok_or_else(|| IntegrationError::NotFound(format!("no credentials stored for {}", key)))?;

        let json = match &self.encryption_key {
            Some(master) => encryption::open(&value, master)
                .map_err(|e| IntegrationError::CorruptRecord(format!("{:#}", e)))?,
            None => value,
        };

        let record: CredentialRecord = serde_json::from_str(&json)
            .map_err(|e| IntegrationError::CorruptRecord(e.to_string()))?;
        if record.access_token.is_empty() {
            return Err(IntegrationError::CorruptRecord(
                "stored record has no access token".into(),
            ));
        }
        Ok(record)
    }

    /// Deletes the record under `key`. Returns `false` if none existed.
    pub async fn delete(&self, key: &CredentialKey) -> Result<bool> {
        self.store.delete(&key.to_string()).await
    }
}
