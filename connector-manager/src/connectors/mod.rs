//! Built-in provider connectors.

pub mod airtable;
pub mod hubspot;
pub mod notion;

use linkhub::{IntegrationError, Result};
use reqwest::Response;

/// Maps a non-2xx provider response to [`IntegrationError::Upstream`].
pub(crate) async fn ensure_success(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(IntegrationError::Upstream {
        status: status.as_u16(),
        body,
    })
}

/// Transport-level failure (connect, timeout, undecodable body).
pub(crate) fn http_error(context: &str, e: reqwest::Error) -> IntegrationError {
    IntegrationError::Http(format!("{}: {}", context, e))
}
