// Error taxonomy
pub mod error;

// Process configuration
pub mod config;

// Key-value store abstraction (memory, Redis)
pub mod kv;

// OAuth state tokens (CSRF protection)
pub mod oauth;

// Credential records and storage
pub mod credentials;

// Canonical integration items
pub mod item;

pub use credentials::{CredentialKey, CredentialRecord, CredentialStore};
pub use error::{IntegrationError, Result};
pub use item::IntegrationItem;
pub use oauth::{StateEntry, StateManager};
