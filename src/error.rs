//! Error taxonomy shared by every integration operation.
//!
//! Each variant maps to exactly one transport status; the mapping itself
//! lives in the HTTP layer (`connector_manager::api`).

use thiserror::Error;

/// Errors produced by the OAuth connector lifecycle.
#[derive(Debug, Error)]
pub enum IntegrationError {
    /// A required input was missing or malformed
    #[error("validation error: {0}")]
    Validation(String),

    /// CSRF state token missing, expired, replayed, or issued for another provider
    #[error("invalid or expired OAuth state")]
    InvalidState,

    /// Token endpoint returned non-2xx or a response without an access token
    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// No stored credential for the requested key
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored credential payload could not be opened or parsed
    #[error("corrupt credential record: {0}")]
    CorruptRecord(String),

    /// Authenticated provider call returned non-2xx
    #[error("upstream error {status}: {body}")]
    Upstream { status: u16, body: String },

    /// Transport failure talking to a provider (connect, timeout, bad body)
    #[error("http error: {0}")]
    Http(String),

    /// Key-value backend failure
    #[error("store error: {0}")]
    Store(String),
}

impl IntegrationError {
    /// Stable machine-readable name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            IntegrationError::Validation(_) => "ValidationError",
            IntegrationError::InvalidState => "InvalidState",
            IntegrationError::TokenExchangeFailed(_) => "TokenExchangeFailed",
            IntegrationError::NotFound(_) => "NotFound",
            IntegrationError::CorruptRecord(_) => "CorruptRecord",
            IntegrationError::Upstream { .. } => "UpstreamError",
            IntegrationError::Http(_) => "HttpError",
            IntegrationError::Store(_) => "StoreError",
        }
    }
}

pub type Result<T> = std::result::Result<T, IntegrationError>;
