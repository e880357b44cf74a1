//! Webhook endpoint: the messaging platform's callback.

use axum::Router;
use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;

use crate::api::dto::ResponseEnvelope;
use crate::app_state::AppState;

/// `POST /callback` — Generate an image for the first message of the envelope.
///
/// Runs the whole pipeline before answering. The HTTP status mirrors the
/// envelope's `statusCode`; the body is the envelope's `body`.
#[utoipa::path(
    post,
    path = "/callback",
    tag = "Webhook",
    summary = "Messaging platform callback",
    description = "Generates an image for `events[0].message.text`, uploads it, and pushes the link to `events[0].source.userId`.",
    request_body(content = serde_json::Value, content_type = "application/json"),
    responses(
        (status = 200, description = "Image delivered or prompt rejected"),
        (status = 500, description = "Invocation failed; the user was sent a generic error"),
    )
)]
pub async fn callback(State(state): State<AppState>, body: Bytes) -> ResponseEnvelope {
    let outcome = state.webhook_service.handle(&body).await;
    ResponseEnvelope::from(&outcome)
}

/// Webhook routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/callback", post(callback))
}
