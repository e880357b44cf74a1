//! HTTP API layer: route handlers, DTOs, OpenAPI document, and router
//! composition.

pub mod dto;
pub mod handlers;

use axum::Router;
use utoipa::OpenApi;

use crate::app_state::AppState;

/// OpenAPI description of the service.
#[derive(Debug, OpenApi)]
#[openapi(
    paths(handlers::webhook::callback, handlers::system::health_handler),
    components(schemas(dto::ResponseEnvelope, handlers::system::HealthResponse)),
    tags(
        (name = "Webhook", description = "Messaging platform callback"),
        (name = "System", description = "Operational endpoints"),
    )
)]
pub struct ApiDoc;

/// Builds the complete API router.
pub fn build_router() -> Router<AppState> {
    let router = handlers::routes();

    #[cfg(feature = "swagger-ui")]
    let router = router.merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui")
            .url("/api-docs/openapi.json", ApiDoc::openapi()),
    );

    router
}
