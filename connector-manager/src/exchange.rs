//! OAuth token exchange logic.
//!
//! Handles exchanging authorization codes for access tokens.

use crate::types::{ClientAuth, ClientCredentials, OAuthConfig};
use linkhub::{CredentialRecord, IntegrationError, Result};
use reqwest::Client;
use serde_json::Value;

/// Exchange authorization code for access token
///
/// Performs exactly one POST to the connector's token endpoint with
/// `grant_type=authorization_code`, authenticating the client the way the
/// provider expects.
///
/// # Returns
/// * `Ok(CredentialRecord)` - Access token plus every other response field as metadata
/// * `Err(TokenExchangeFailed)` - Transport failure, non-2xx status, or no access token
pub async fn exchange_code_for_token(
    http: &Client,
    oauth: &OAuthConfig,
    client: &ClientCredentials,
    code: &str,
    code_verifier: Option<&str>,
) -> Result<CredentialRecord> {
    let mut form_data: Vec<(&str, &str)> = vec![
        ("grant_type", "authorization_code"),
        ("code", code),
        ("redirect_uri", client.redirect_uri.as_str()),
    ];
    if let Some(verifier) = code_verifier {
        form_data.push(("code_verifier", verifier));
    }

    tracing::debug!(token_url = %oauth.token_url, "Exchanging authorization code for token");

    let request = http
        .post(&oauth.token_url)
        .header("Accept", "application/json");

    let request = match oauth.client_auth {
        ClientAuth::RequestBody => {
            form_data.push(("client_id", client.client_id.as_str()));
            form_data.push(("client_secret", client.client_secret.as_str()));
            request.form(&form_data)
        }
        ClientAuth::BasicForm => {
            form_data.push(("client_id", client.client_id.as_str()));
            request
                .basic_auth(&client.client_id, Some(&client.client_secret))
                .form(&form_data)
        }
        ClientAuth::BasicJson => {
            let body: serde_json::Map<String, Value> = form_data
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            request
                .basic_auth(&client.client_id, Some(&client.client_secret))
                .json(&body)
        }
    };

    let response = request.send().await.map_err(|e| {
        IntegrationError::TokenExchangeFailed(format!("failed to send token request: {}", e))
    })?;

    // Check response status
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(IntegrationError::TokenExchangeFailed(format!(
            "token endpoint returned {}: {}",
            status, body
        )));
    }

    // Parse token response
    let token_response: Value = response.json().await.map_err(|e| {
        IntegrationError::TokenExchangeFailed(format!("failed to parse token response: {}", e))
    })?;

    let record = CredentialRecord::from_token_response(&token_response)?;

    tracing::debug!(
        has_refresh_token = record.refresh_token.is_some(),
        expires_in = ?record.expires_in,
        "Token exchange successful"
    );

    Ok(record)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn oauth(token_url: String, client_auth: ClientAuth) -> OAuthConfig {
        OAuthConfig {
            auth_url: "https://example.com/authorize".to_string(),
            token_url,
            scopes: vec![],
            extra_params: vec![],
            client_auth,
            pkce: false,
        }
    }

    fn client() -> ClientCredentials {
        ClientCredentials {
            client_id: "cid".to_string(),
            client_secret: "csecret".to_string(),
            redirect_uri: "http://localhost:8000/cb".to_string(),
        }
    }

    #[tokio::test]
    async fn test_request_body_client_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded("code".into(), "abc".into()),
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
                Matcher::UrlEncoded("client_secret".into(), "csecret".into()),
                Matcher::UrlEncoded("redirect_uri".into(), "http://localhost:8000/cb".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"t1","refresh_token":"r1","expires_in":3600}"#)
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::RequestBody);
        let record = exchange_code_for_token(&Client::new(), &config, &client(), "abc", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.access_token, "t1");
        assert_eq!(record.metadata["refresh_token"], "r1");
        assert_eq!(record.metadata["expires_in"], "3600");
    }

    #[tokio::test]
    async fn test_basic_form_with_code_verifier() {
        let mut server = Server::new_async().await;
        // "cid:csecret" base64-encoded
        let mock = server
            .mock("POST", "/token")
            .match_header("authorization", "Basic Y2lkOmNzZWNyZXQ=")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("code_verifier".into(), "verifier-1".into()),
                Matcher::UrlEncoded("client_id".into(), "cid".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"air","refresh_token":"air-r","expires_in":3600,"refresh_expires_in":5184000}"#)
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::BasicForm);
        let record = exchange_code_for_token(
            &Client::new(),
            &config,
            &client(),
            "abc",
            Some("verifier-1"),
        )
        .await
        .unwrap();

        mock.assert_async().await;
        assert_eq!(record.access_token, "air");
        assert_eq!(record.metadata["refresh_expires_in"], "5184000");
    }

    #[tokio::test]
    async fn test_basic_json_client_auth() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_header("authorization", "Basic Y2lkOmNzZWNyZXQ=")
            .match_body(Matcher::PartialJson(json!({
                "grant_type": "authorization_code",
                "code": "abc",
                "redirect_uri": "http://localhost:8000/cb"
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"secret_n","workspace_id":"ws1","workspace_name":"Acme","bot_id":"b1"}"#)
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::BasicJson);
        let record = exchange_code_for_token(&Client::new(), &config, &client(), "abc", None)
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(record.access_token, "secret_n");
        assert_eq!(record.metadata["workspace_name"], "Acme");
    }

    #[tokio::test]
    async fn test_non_success_status_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_client"}"#)
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::RequestBody);
        let err = exchange_code_for_token(&Client::new(), &config, &client(), "abc", None)
            .await
            .unwrap_err();

        match err {
            IntegrationError::TokenExchangeFailed(msg) => {
                assert!(msg.contains("401"));
                assert!(msg.contains("invalid_client"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_missing_access_token_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"refresh_token":"r1"}"#)
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::RequestBody);
        let err = exchange_code_for_token(&Client::new(), &config, &client(), "abc", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::TokenExchangeFailed(_)));
    }

    #[tokio::test]
    async fn test_malformed_body_fails() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let config = oauth(format!("{}/token", server.url()), ClientAuth::RequestBody);
        let err = exchange_code_for_token(&Client::new(), &config, &client(), "abc", None)
            .await
            .unwrap_err();
        assert!(matches!(err, IntegrationError::TokenExchangeFailed(_)));
    }
}
