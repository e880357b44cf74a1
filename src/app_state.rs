//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::service::WebhookService;

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Per-invocation orchestration.
    pub webhook_service: Arc<WebhookService>,
}
