//! Server initialization and run loop

use super::config::AppConfig;
use super::loader::load_config;
use super::providers::{resolve_llm_provider, resolve_tool_registry};
use super::validation::validate_production_config;
use anyhow::{Context, Result};
use axum::routing::get;
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};
use wayfarer_core::{ConversationStore, TravelAssistant};

/// Build the assistant service from loaded configuration
pub fn build_assistant(config: &AppConfig) -> Result<Arc<TravelAssistant>> {
    let llm = resolve_llm_provider(&config.llm)?;
    let tools = resolve_tool_registry(&config.amap)?;

    Ok(Arc::new(TravelAssistant::new(
        llm,
        tools,
        config.assistant_config(),
    )))
}

/// Full application router
pub fn build_app(assistant: Arc<TravelAssistant>) -> Router {
    Router::new()
        .route("/", get(|| async { "Wayfarer Travel Assistant" }))
        .merge(crate::api::api_router(assistant))
        .merge(crate::api::docs::docs_router())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Periodically drop expired conversations until `shutdown` fires
pub fn spawn_session_cleanup(
    store: Arc<ConversationStore>,
    interval: Duration,
    shutdown: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let removed = store.cleanup_expired().await;
                    debug!(removed, "Conversation cleanup pass");
                }
            }
        }
    })
}

/// Run the HTTP server until ctrl-c / SIGTERM
pub async fn run(port_override: Option<u16>) -> Result<()> {
    let mut config = load_config()?;
    if let Some(port) = port_override {
        config.server.port = port;
    }

    validate_production_config(&config);

    info!(
        "Starting Wayfarer Travel Assistant v{}",
        env!("CARGO_PKG_VERSION")
    );

    let assistant = build_assistant(&config)?;
    let shutdown = CancellationToken::new();

    let cleanup = spawn_session_cleanup(
        Arc::clone(assistant.store()),
        Duration::from_secs(config.conversation.cleanup_interval_secs.max(1)),
        shutdown.clone(),
    );

    let app = build_app(assistant);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid server address")?;

    info!("HTTP server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            wait_for_shutdown_signal().await;
            server_shutdown.cancel();
        })
        .await
        .context("HTTP server error")?;

    shutdown.cancel();
    let _ = cleanup.await;

    info!("Wayfarer shutdown complete");
    Ok(())
}

async fn wait_for_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C signal"),
        _ = terminate => info!("Received SIGTERM signal"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_core::{ConversationStore, Role, StoreConfig};

    #[tokio::test]
    async fn test_cleanup_task_stops_on_shutdown() {
        let store = Arc::new(ConversationStore::new(StoreConfig {
            ttl: Duration::from_millis(10),
            ..StoreConfig::default()
        }));
        let session = store.get_or_create(None).await.unwrap();
        store
            .append_turn(session.conversation_id, Role::User, "你好")
            .await
            .unwrap();

        let shutdown = CancellationToken::new();
        let handle = spawn_session_cleanup(
            Arc::clone(&store),
            Duration::from_millis(20),
            shutdown.clone(),
        );

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert!(store.is_empty().await);

        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
