use anyhow::{Context, Result};
use connector_manager::api::{cors_layer, create_router, ApiState};
use connector_manager::registry::AVAILABLE_CONNECTORS;
use connector_manager::{ConnectorRegistry, FlowContext};
use linkhub::config::{load_config, HubConfig, StoreBackend};
use linkhub::kv::{run_expiry_sweep, KeyValueStore, MemoryStore, RedisStore};
use linkhub::{CredentialStore, StateManager};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing subscriber
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "connector_manager=info,linkhub=info".into()),
        )
        .init();

    info!("LinkHub integration API starting...");

    // Load configuration (file is optional, env overrides always apply)
    let mut config = match std::env::var("LINKHUB_CONFIG") {
        Ok(path) => load_config(&path)?,
        Err(_) => HubConfig::default(),
    };
    config.apply_env_overrides(AVAILABLE_CONNECTORS);

    info!(
        bind_addr = %config.server.bind_addr,
        public_url = %config.server.public_url,
        backend = ?config.store.backend,
        org_scoped = config.credentials.org_scoped,
        "Configuration loaded"
    );

    // Initialize key-value store (shared by state manager and credential store)
    let kv: Arc<dyn KeyValueStore> = match config.store.backend {
        StoreBackend::Memory => {
            let store = Arc::new(MemoryStore::new());
            tokio::spawn(run_expiry_sweep(
                Arc::clone(&store),
                config.store.sweep_interval_seconds,
            ));
            info!("Using in-memory key-value store");
            store
        }
        StoreBackend::Redis => {
            let store = RedisStore::connect(&config.store.redis_url)
                .await
                .context("Failed to connect to Redis")?;
            info!("Using Redis key-value store");
            Arc::new(store)
        }
    };

    let states = StateManager::new(Arc::clone(&kv), config.store.state_ttl_seconds);

    let mut credentials = CredentialStore::new(Arc::clone(&kv));
    if let Some(key) = &config.credentials.encryption_key {
        credentials = credentials
            .with_encryption(key)
            .context("Failed to initialize credential encryption")?;
        info!("Credential encryption at rest enabled");
    }

    let http = reqwest::Client::builder()
        .timeout(config.http.timeout())
        .build()
        .context("Failed to build HTTP client")?;

    let ctx = FlowContext {
        states,
        credentials,
        http,
        credential_ttl: config.credentials.ttl(),
        org_scoped: config.credentials.org_scoped,
    };
    let registry = Arc::new(ConnectorRegistry::from_config(&config, ctx));

    // Start HTTP API server
    let api_state = ApiState {
        registry,
        frontend_url: config.server.frontend_url.clone(),
    };
    let router = create_router(api_state)
        .layer(cors_layer(&config.server.cors_origins))
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind_addr))?;
    info!(addr = %config.server.bind_addr, "Integration API listening");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Integration API server error")?;

    info!("Integration API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for ctrl_c signal");
    }
    info!("Shutdown signal received");
}
