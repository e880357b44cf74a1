//! imagegen-webhook server entry point.
//!
//! Starts the Axum HTTP server with the webhook and system endpoints.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use imagegen_webhook::api;
use imagegen_webhook::app_state::AppState;
use imagegen_webhook::clients::{
    GyazoImageHost, LineMessagingClient, OpenAiImageGenerator, build_http_client,
};
use imagegen_webhook::config::{LogFormat, WebhookConfig};
use imagegen_webhook::persistence::{GenerationStore, LogOnlyStore, PostgresGenerationStore};
use imagegen_webhook::service::WebhookService;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = WebhookConfig::from_env().context("loading configuration")?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt().json().with_env_filter(filter).init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, model = %config.image_model, "starting imagegen-webhook");

    // Build outbound clients
    let http = build_http_client(config.http_timeout).context("building HTTP client")?;
    let generator = Arc::new(OpenAiImageGenerator::new(
        http.clone(),
        &config.openai_base_url,
        config.openai_api_key.clone(),
        config.image_model.clone(),
    ));
    let messaging = Arc::new(LineMessagingClient::new(
        http.clone(),
        &config.line_api_base_url,
        config.line_channel_access_token.clone(),
    ));
    let image_host = Arc::new(GyazoImageHost::new(
        http,
        &config.gyazo_upload_base_url,
        config.gyazo_access_token.clone(),
    ));

    // Build persistence layer
    let store: Arc<dyn GenerationStore> = if config.persistence_enabled {
        let store =
            PostgresGenerationStore::connect(&config.database_url, config.database_max_connections)
                .await
                .context("connecting to PostgreSQL")?;
        Arc::new(store)
    } else {
        tracing::warn!("persistence disabled; generation records will only be logged");
        Arc::new(LogOnlyStore)
    };

    // Build service layer
    let webhook_service = Arc::new(WebhookService::new(generator, messaging, image_host, store));
    let app_state = AppState { webhook_service };

    // Build router
    let app = Router::new()
        .merge(api::build_router())
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr)
        .await
        .with_context(|| format!("binding {}", config.listen_addr))?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %err, "failed to listen for shutdown signal");
    }
}
