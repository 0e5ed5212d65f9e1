//! Integration HTTP API.
//!
//! Every provider exposes the same routes under `/integrations/:provider`:
//! - `POST   /authorize` - start the OAuth flow (redirect, or `{"url"}` with `?format=json`)
//! - `GET    /oauth2callback` - provider redirect target
//! - `POST   /credentials` - stored credentials for `user_id` / `org_id`
//! - `GET    /credentials/:user_id` and `DELETE /credentials/:user_id` (optional `?org_id=`)
//! - `POST   /load` - fetch items with caller-supplied credentials
//! - `GET    /items/:user_id` - fetch items with stored credentials (optional `?org_id=`)

use crate::integration::Integration;
use crate::registry::ConnectorRegistry;
use axum::{
    extract::{rejection::FormRejection, Form, Path, Query, State},
    http::{HeaderValue, Method, StatusCode},
    response::{IntoResponse, Json, Redirect, Response},
    routing::{get, post},
    Router,
};
use linkhub::{CredentialRecord, IntegrationError, IntegrationItem};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tracing::{debug, warn};

/// Org used by the path-only routes when no `org_id` query is given.
pub const DEFAULT_ORG: &str = "default";

/// Shared state for the integration API handlers.
#[derive(Clone)]
pub struct ApiState {
    pub registry: Arc<ConnectorRegistry>,
    /// When set, successful callbacks redirect to `{frontend_url}/{provider}-oauth-success`
    pub frontend_url: Option<String>,
}

/// Form body for `POST /authorize` and `POST /credentials`.
#[derive(Debug, Deserialize)]
pub struct UserForm {
    user_id: Option<String>,
    org_id: Option<String>,
}

/// Query for the path-only routes.
#[derive(Debug, Deserialize)]
pub struct OrgQuery {
    org_id: Option<String>,
}

impl OrgQuery {
    fn org_id(&self) -> &str {
        self.org_id.as_deref().unwrap_or(DEFAULT_ORG)
    }
}

#[derive(Debug, Deserialize)]
pub struct AuthorizeQuery {
    format: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthorizeResponse {
    url: String,
}

/// OAuth callback query parameters
#[derive(Debug, Deserialize)]
pub struct OAuthCallback {
    code: Option<String>,
    state: Option<String>,
    error: Option<String>,
    error_description: Option<String>,
}

/// OAuth success response (when no frontend redirect is configured)
#[derive(Debug, Serialize)]
pub struct OAuthSuccessResponse {
    success: bool,
    message: String,
    provider: String,
    integration_id: String,
}

/// Form body for `POST /load`.
#[derive(Debug, Deserialize)]
pub struct LoadForm {
    credentials: Option<String>,
}

#[derive(Debug, Serialize)]
struct IndexResponse {
    message: String,
}

#[derive(Debug, Serialize)]
struct IntegrationsResponse {
    integrations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct RevokeResponse {
    success: bool,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    kind: &'static str,
}

// ---------------------------------------------------------------------------
// Error handling
// ---------------------------------------------------------------------------

/// Maps [`IntegrationError`] onto HTTP status codes.
#[derive(Debug)]
pub struct ApiError(IntegrationError);

impl From<IntegrationError> for ApiError {
    fn from(e: IntegrationError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            IntegrationError::Validation(_) | IntegrationError::InvalidState => {
                StatusCode::BAD_REQUEST
            }
            IntegrationError::NotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            error: self.0.to_string(),
            kind: self.0.kind(),
        });
        (status, body).into_response()
    }
}

/// Unwraps a form body, reporting a missing or malformed body as a validation error.
fn form_body<T>(form: Result<Form<T>, FormRejection>) -> Result<T, ApiError> {
    form.map(|Form(value)| value).map_err(|rejection| {
        ApiError(IntegrationError::Validation(format!(
            "invalid form body: {}",
            rejection.body_text()
        )))
    })
}

// ---------------------------------------------------------------------------
// HTTP handlers
// ---------------------------------------------------------------------------

fn lookup(state: &ApiState, provider: &str) -> Result<Arc<Integration>, ApiError> {
    state.registry.get(provider).ok_or_else(|| {
        warn!(provider = %provider, "Unknown or unconfigured integration");
        ApiError(IntegrationError::NotFound(format!(
            "integration '{}' is not available",
            provider
        )))
    })
}

async fn index() -> Json<IndexResponse> {
    Json(IndexResponse {
        message: "Welcome to the LinkHub integration API".to_string(),
    })
}

async fn list_integrations(State(state): State<Arc<ApiState>>) -> Json<IntegrationsResponse> {
    Json(IntegrationsResponse {
        integrations: state.registry.names(),
    })
}

/// POST /integrations/:provider/authorize
async fn authorize(
    State(state): State<Arc<ApiState>>,
    Path(provider): Path<String>,
    Query(query): Query<AuthorizeQuery>,
    form: Result<Form<UserForm>, FormRejection>,
) -> Result<Response, ApiError> {
    let integration = lookup(&state, &provider)?;
    let form = form_body(form)?;

    let url = integration
        .begin_authorization(
            form.user_id.as_deref().unwrap_or_default(),
            form.org_id.as_deref().unwrap_or_default(),
        )
        .await?;

    if query.format.as_deref() == Some("json") {
        return Ok(Json(AuthorizeResponse { url }).into_response());
    }
    Ok(Redirect::temporary(&url).into_response())
}

/// GET /integrations/:provider/oauth2callback
async fn oauth2callback(
    State(state): State<Arc<ApiState>>,
    Path(provider): Path<String>,
    Query(callback): Query<OAuthCallback>,
) -> Result<Response, ApiError> {
    debug!(provider = %provider, "OAuth callback received");
    let integration = lookup(&state, &provider)?;

    if let Some(error) = callback.error {
        let description = callback
            .error_description
            .unwrap_or_else(|| "Unknown error".to_string());
        warn!(
            provider = %provider,
            error = %error,
            description = %description,
            "OAuth authorization failed"
        );
        return Err(ApiError(IntegrationError::Validation(format!(
            "OAuth authorization failed: {} - {}",
            error, description
        ))));
    }

    let code = callback.code.ok_or_else(|| {
        ApiError(IntegrationError::Validation(
            "missing 'code' parameter".to_string(),
        ))
    })?;
    let csrf_state = callback.state.ok_or_else(|| {
        ApiError(IntegrationError::Validation(
            "missing 'state' parameter".to_string(),
        ))
    })?;

    let (entry, _) = integration
        .complete_authorization(&code, &csrf_state)
        .await?;

    if let Some(frontend) = &state.frontend_url {
        let target = format!(
            "{}/{}-oauth-success?success=true&integration_id={}",
            frontend.trim_end_matches('/'),
            provider,
            urlencoding::encode(&entry.user_id)
        );
        return Ok(Redirect::temporary(&target).into_response());
    }

    Ok(Json(OAuthSuccessResponse {
        success: true,
        message: format!("Successfully connected {}", provider),
        provider,
        integration_id: entry.user_id,
    })
    .into_response())
}

/// POST /integrations/:provider/credentials
async fn post_credentials(
    State(state): State<Arc<ApiState>>,
    Path(provider): Path<String>,
    form: Result<Form<UserForm>, FormRejection>,
) -> Result<Json<CredentialRecord>, ApiError> {
    let integration = lookup(&state, &provider)?;
    let form = form_body(form)?;
    let record = integration
        .load_credentials(
            form.user_id.as_deref().unwrap_or_default(),
            form.org_id.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(Json(record))
}

/// GET /integrations/:provider/credentials/:user_id
async fn get_credentials(
    State(state): State<Arc<ApiState>>,
    Path((provider, user_id)): Path<(String, String)>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<CredentialRecord>, ApiError> {
    let integration = lookup(&state, &provider)?;
    let record = integration.load_credentials(&user_id, query.org_id()).await?;
    Ok(Json(record))
}

/// DELETE /integrations/:provider/credentials/:user_id
async fn delete_credentials(
    State(state): State<Arc<ApiState>>,
    Path((provider, user_id)): Path<(String, String)>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<RevokeResponse>, ApiError> {
    let integration = lookup(&state, &provider)?;
    if !integration.revoke_credentials(&user_id, query.org_id()).await? {
        return Err(ApiError(IntegrationError::NotFound(format!(
            "no {} credentials for user '{}'",
            provider, user_id
        ))));
    }
    Ok(Json(RevokeResponse { success: true }))
}

/// POST /integrations/:provider/load
async fn load(
    State(state): State<Arc<ApiState>>,
    Path(provider): Path<String>,
    form: Result<Form<LoadForm>, FormRejection>,
) -> Result<Json<Vec<IntegrationItem>>, ApiError> {
    let integration = lookup(&state, &provider)?;
    let serialized = form_body(form)?.credentials.ok_or_else(|| {
        ApiError(IntegrationError::Validation(
            "missing required field 'credentials'".to_string(),
        ))
    })?;
    let credentials = CredentialRecord::parse(&serialized)?;
    let items = integration.fetch_items(&credentials).await?;
    Ok(Json(items))
}

/// GET /integrations/:provider/items/:user_id
async fn get_items(
    State(state): State<Arc<ApiState>>,
    Path((provider, user_id)): Path<(String, String)>,
    Query(query): Query<OrgQuery>,
) -> Result<Json<Vec<IntegrationItem>>, ApiError> {
    let integration = lookup(&state, &provider)?;
    let items = integration.load_items(&user_id, query.org_id()).await?;
    Ok(Json(items))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/integrations", get(list_integrations))
        .route("/integrations/:provider/authorize", post(authorize))
        .route("/integrations/:provider/oauth2callback", get(oauth2callback))
        .route("/integrations/:provider/credentials", post(post_credentials))
        .route(
            "/integrations/:provider/credentials/:user_id",
            get(get_credentials).delete(delete_credentials),
        )
        .route("/integrations/:provider/load", post(load))
        .route("/integrations/:provider/items/:user_id", get(get_items))
        .with_state(Arc::new(state))
}

/// CORS for the configured frontend origins (credentials allowed).
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oauth_callback_deserialization() {
        // Success case
        let query = "code=auth_code_123&state=csrf_state_456";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.code, Some("auth_code_123".to_string()));
        assert_eq!(callback.state, Some("csrf_state_456".to_string()));
        assert_eq!(callback.error, None);

        // Error case
        let query = "error=access_denied&error_description=User+cancelled";
        let callback: OAuthCallback = serde_urlencoded::from_str(query).unwrap();
        assert_eq!(callback.error, Some("access_denied".to_string()));
        assert_eq!(callback.error_description, Some("User cancelled".to_string()));
        assert_eq!(callback.code, None);
    }

    #[test]
    fn test_user_form_fields_optional() {
        let form: UserForm = serde_urlencoded::from_str("user_id=u1").unwrap();
        assert_eq!(form.user_id.as_deref(), Some("u1"));
        assert!(form.org_id.is_none());

        let form: UserForm = serde_urlencoded::from_str("").unwrap();
        assert!(form.user_id.is_none());
    }

    #[test]
    fn test_oauth_success_response_serialization() {
        let response = OAuthSuccessResponse {
            success: true,
            message: "Successfully connected hubspot".to_string(),
            provider: "hubspot".to_string(),
            integration_id: "u1".to_string(),
        };

        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"success\":true"));
        assert!(json.contains("\"provider\":\"hubspot\""));
        assert!(json.contains("\"integration_id\":\"u1\""));
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (IntegrationError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (IntegrationError::InvalidState, StatusCode::BAD_REQUEST),
            (IntegrationError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (
                IntegrationError::TokenExchangeFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                IntegrationError::Upstream {
                    status: 401,
                    body: "x".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (IntegrationError::CorruptRecord("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (IntegrationError::Store("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (err, expected) in cases {
            let kind = err.kind();
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), expected, "kind {}", kind);
        }
    }

    #[test]
    fn test_cors_layer_skips_invalid_origins() {
        // Must not panic on a header value with control characters
        let _layer = cors_layer(&["http://localhost:3000".to_string(), "bad\norigin".to_string()]);
    }
}
