use super::*;
use crate::connectors::airtable::AirtableConnector;
use crate::connectors::hubspot::HubSpotConnector;
use linkhub::kv::MemoryStore;
use mockito::{Matcher, Server, ServerGuard};

fn context(org_scoped: bool) -> FlowContext {
    let kv = Arc::new(MemoryStore::new());
    FlowContext {
        states: StateManager::new(kv.clone(), 600),
        credentials: CredentialStore::new(kv),
        http: Client::new(),
        credential_ttl: None,
        org_scoped,
    }
}

fn client() -> ClientCredentials {
    ClientCredentials {
        client_id: "hub-client".to_string(),
        client_secret: "hub-secret".to_string(),
        redirect_uri: "http://localhost:8000/integrations/hubspot/oauth2callback".to_string(),
    }
}

fn hubspot(server: &ServerGuard, ctx: FlowContext) -> Integration {
    Integration::new(
        Arc::new(HubSpotConnector::with_base_url(server.url())),
        client(),
        ctx,
    )
    .with_endpoints(None, Some(format!("{}/oauth/v1/token", server.url())))
}

fn airtable(server: &ServerGuard, ctx: FlowContext) -> Integration {
    Integration::new(
        Arc::new(AirtableConnector::with_base_url(server.url())),
        client(),
        ctx,
    )
    .with_endpoints(None, Some(format!("{}/oauth2/v1/token", server.url())))
}

/// Pulls a decoded query parameter out of a URL.
fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == name {
            urlencoding::decode(v).ok().map(|s| s.into_owned())
        } else {
            None
        }
    })
}

#[tokio::test]
async fn test_begin_authorization_url() {
    let server = Server::new_async().await;
    let ctx = context(false);
    let integration = hubspot(&server, ctx.clone());

    let url = integration.begin_authorization("u1", "o1").await.unwrap();

    assert!(url.starts_with("https://app.hubspot.com/oauth/authorize?"));
    assert_eq!(query_param(&url, "client_id").as_deref(), Some("hub-client"));
    assert_eq!(
        query_param(&url, "redirect_uri").as_deref(),
        Some("http://localhost:8000/integrations/hubspot/oauth2callback")
    );
    assert!(query_param(&url, "code_challenge").is_none());

    let state = query_param(&url, "state").unwrap();
    let entry = ctx.states.consume(&state).await.unwrap();
    assert_eq!(entry.user_id, "u1");
    assert_eq!(entry.org_id, "o1");
    assert_eq!(entry.provider, "hubspot");
    assert!(ctx.states.consume(&state).await.is_err());
}

#[tokio::test]
async fn test_begin_authorization_requires_user_and_org() {
    let server = Server::new_async().await;
    let integration = hubspot(&server, context(false));

    let err = integration.begin_authorization("", "o1").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Validation(_)));

    let err = integration.begin_authorization("u1", "  ").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Validation(_)));
}

#[tokio::test]
async fn test_complete_authorization_stores_credentials() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/oauth/v1/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("code".into(), "abc".into()),
            Matcher::UrlEncoded("client_id".into(), "hub-client".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"t1","refresh_token":"r1","expires_in":3600}"#)
        .expect(1)
        .create_async()
        .await;

    let ctx = context(false);
    let integration = hubspot(&server, ctx.clone());
    let url = integration.begin_authorization("u1", "o1").await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let (entry, record) = integration.complete_authorization("abc", &state).await.unwrap();
    token.assert_async().await;

    assert_eq!(entry.user_id, "u1");
    assert_eq!(record.access_token, "t1");
    assert_eq!(record.refresh_token.as_deref(), Some("r1"));
    assert_eq!(record.expires_in, Some(3600));

    let stored = ctx
        .credentials
        .get(&CredentialKey::new("u1", "hubspot"))
        .await
        .unwrap();
    assert_eq!(stored, record);

    let loaded = integration.load_credentials("u1", "o1").await.unwrap();
    assert_eq!(loaded.access_token, "t1");
}

#[tokio::test]
async fn test_invalid_state_makes_no_token_request() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/oauth/v1/token")
        .expect(0)
        .create_async()
        .await;

    let ctx = context(false);
    let integration = hubspot(&server, ctx.clone());

    let err = integration
        .complete_authorization("abc", "never-issued")
        .await
        .unwrap_err();
    assert!(matches!(err, IntegrationError::InvalidState));

    token.assert_async().await;
    let err = integration.load_credentials("u1", "o1").await.unwrap_err();
    assert!(matches!(err, IntegrationError::NotFound(_)));
}

#[tokio::test]
async fn test_replayed_state_rejected() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", "/oauth/v1/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"t1"}"#)
        .expect(1)
        .create_async()
        .await;

    let integration = hubspot(&server, context(false));
    let url = integration.begin_authorization("u1", "o1").await.unwrap();
    let state = query_param(&url, "state").unwrap();

    integration.complete_authorization("abc", &state).await.unwrap();
    let err = integration
        .complete_authorization("abc", &state)
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrationError::InvalidState));
    token.assert_async().await;
}

#[tokio::test]
async fn test_token_rejection_leaves_store_untouched() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth/v1/token")
        .with_status(401)
        .with_body(r#"{"status":"BAD_AUTH_CODE"}"#)
        .create_async()
        .await;

    let integration = hubspot(&server, context(false));
    let url = integration.begin_authorization("u1", "o1").await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let err = integration
        .complete_authorization("bad", &state)
        .await
        .unwrap_err();
    assert!(matches!(err, IntegrationError::TokenExchangeFailed(_)));

    let err = integration.load_credentials("u1", "o1").await.unwrap_err();
    assert!(matches!(err, IntegrationError::NotFound(_)));
}

#[tokio::test]
async fn test_missing_code_rejected_before_state_consumed() {
    let server = Server::new_async().await;
    let ctx = context(false);
    let integration = hubspot(&server, ctx.clone());
    let url = integration.begin_authorization("u1", "o1").await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let err = integration.complete_authorization("", &state).await.unwrap_err();
    assert!(matches!(err, IntegrationError::Validation(_)));

    // The state is still redeemable.
    assert!(ctx.states.consume(&state).await.is_ok());
}

#[tokio::test]
async fn test_state_for_other_provider_rejected() {
    let mut server = Server::new_async().await;
    let token = server
        .mock("POST", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let ctx = context(false);
    let hub = hubspot(&server, ctx.clone());
    let air = airtable(&server, ctx.clone());

    let url = air.begin_authorization("u1", "o1").await.unwrap();
    let state = query_param(&url, "state").unwrap();

    let err = hub.complete_authorization("abc", &state).await.unwrap_err();
    assert!(matches!(err, IntegrationError::InvalidState));
    token.assert_async().await;
}

#[tokio::test]
async fn test_pkce_verifier_matches_challenge() {
    let mut server = Server::new_async().await;
    let ctx = context(false);
    let integration = airtable(&server, ctx.clone());

    let url = integration.begin_authorization("u1", "o1").await.unwrap();
    let challenge = query_param(&url, "code_challenge").unwrap();
    assert_eq!(query_param(&url, "code_challenge_method").as_deref(), Some("S256"));

    let state = query_param(&url, "state").unwrap();
    let entry = ctx.states.consume(&state).await.unwrap();
    let verifier = entry.code_verifier.clone().unwrap();
    assert_eq!(pkce::challenge_for(&verifier), challenge);

    // Re-issue so the exchange can run end to end with the stored verifier.
    let state = ctx
        .states
        .issue("u1", "o1", "airtable", Some(verifier.clone()))
        .await
        .unwrap();
    let token = server
        .mock("POST", "/oauth2/v1/token")
        .match_body(Matcher::UrlEncoded("code_verifier".into(), verifier))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"air"}"#)
        .create_async()
        .await;

    let (_, record) = integration.complete_authorization("abc", &state).await.unwrap();
    token.assert_async().await;
    assert_eq!(record.access_token, "air");
}

#[tokio::test]
async fn test_org_scoped_credentials() {
    let mut server = Server::new_async().await;
    let _token = server
        .mock("POST", "/oauth/v1/token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"access_token":"scoped"}"#)
        .create_async()
        .await;

    let ctx = context(true);
    let integration = hubspot(&server, ctx.clone());
    let url = integration.begin_authorization("u1", "acme").await.unwrap();
    let state = query_param(&url, "state").unwrap();
    integration.complete_authorization("abc", &state).await.unwrap();

    let key = CredentialKey::new("u1", "hubspot").with_org("acme");
    assert_eq!(key.to_string(), "integration:acme:u1:hubspot");
    assert_eq!(ctx.credentials.get(&key).await.unwrap().access_token, "scoped");

    assert!(integration.load_credentials("u1", "other").await.is_err());
    assert!(integration.revoke_credentials("u1", "acme").await.unwrap());
    assert!(!integration.revoke_credentials("u1", "acme").await.unwrap());
}

#[tokio::test]
async fn test_credential_lookup_requires_org() {
    let server = Server::new_async().await;
    let ctx = context(false);
    ctx.credentials
        .put(
            &CredentialKey::new("u1", "hubspot"),
            &CredentialRecord::new("t1"),
            None,
        )
        .await
        .unwrap();
    let integration = hubspot(&server, ctx);

    let err = integration.load_credentials("u1", "").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Validation(_)));

    let err = integration.revoke_credentials("u1", " ").await.unwrap_err();
    assert!(matches!(err, IntegrationError::Validation(_)));

    assert!(integration.load_credentials("u1", "o1").await.is_ok());
}

#[tokio::test]
async fn test_colon_ids_do_not_share_credentials() {
    let server = Server::new_async().await;
    let ctx = context(true);
    ctx.credentials
        .put(
            &CredentialKey::new("c", "hubspot").with_org("a:b"),
            &CredentialRecord::new("tenant-ab"),
            None,
        )
        .await
        .unwrap();
    let integration = hubspot(&server, ctx);

    let err = integration.load_credentials("b:c", "a").await.unwrap_err();
    assert!(matches!(err, IntegrationError::NotFound(_)));
    assert!(!integration.revoke_credentials("b:c", "a").await.unwrap());

    let record = integration.load_credentials("c", "a:b").await.unwrap();
    assert_eq!(record.access_token, "tenant-ab");
}

#[tokio::test]
async fn test_fetch_items_rejects_empty_token_without_request() {
    let mut server = Server::new_async().await;
    let contacts = server
        .mock("GET", Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let integration = hubspot(&server, context(false));
    let err = integration
        .fetch_items(&CredentialRecord::new(""))
        .await
        .unwrap_err();

    assert!(matches!(err, IntegrationError::Validation(_)));
    contacts.assert_async().await;
}

#[tokio::test]
async fn test_load_items_uses_stored_credentials() {
    let mut server = Server::new_async().await;
    let contacts = server
        .mock("GET", "/crm/v3/objects/contacts")
        .match_query(Matcher::Any)
        .match_header("authorization", "Bearer stored")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"results":[{"id":"7","properties":{"email":"a@b.c"}}]}"#)
        .create_async()
        .await;

    let ctx = context(false);
    ctx.credentials
        .put(
            &CredentialKey::new("u1", "hubspot"),
            &CredentialRecord::new("stored"),
            None,
        )
        .await
        .unwrap();

    let integration = hubspot(&server, ctx);
    let items = integration.load_items("u1", "o1").await.unwrap();

    contacts.assert_async().await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].id, "7");
    assert_eq!(items[0].item_type, "Contact");
}
