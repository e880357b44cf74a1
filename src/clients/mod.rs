//! Outbound clients: image generation, messaging platform, image host.
//!
//! Each collaborator sits behind an `async_trait` so the
//! [`crate::service::WebhookService`] can be driven by test doubles. The
//! production implementations share one [`reqwest::Client`].

pub mod generator;
pub mod image_host;
pub mod messaging;

use std::time::Duration;

pub use generator::{GeneratedImage, GenerationResponse, ImageGenerator, OpenAiImageGenerator};
pub use image_host::{GyazoImageHost, ImageHost};
pub use messaging::{LineMessagingClient, MessagingClient, PushMessage};

/// Failure talking to an upstream HTTP service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Connection, timeout, or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// Response body was not the expected JSON.
    #[error("malformed response: {0}")]
    Decode(String),

    /// A request URL could not be built from the configured base URL.
    #[error("invalid request URL: {0}")]
    InvalidUrl(String),

    /// A field the caller depends on was absent.
    #[error("response is missing `{0}`")]
    MissingField(&'static str),
}

/// Builds the shared HTTP client with the configured timeout.
///
/// # Errors
///
/// Returns [`ClientError::Transport`] if the TLS backend cannot be initialised.
pub fn build_http_client(timeout: Duration) -> Result<reqwest::Client, ClientError> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

/// Turns a non-success response into [`ClientError::Status`].
async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ClientError::Status {
        status: status.as_u16(),
        body: truncate(&body, 512),
    })
}

/// Reads a response body as JSON without looking at the status code.
async fn read_json(response: reqwest::Response) -> Result<serde_json::Value, ClientError> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", text.get(..idx).unwrap_or_default()),
        None => text.to_string(),
    }
}
