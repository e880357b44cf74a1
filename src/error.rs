//! Webhook error types with HTTP status code mapping.
//!
//! [`WebhookError`] is the central error type for one webhook invocation.
//! Every variant is logged with its [`WebhookError::kind`] so failures stay
//! distinguishable in the logs, while the user only ever sees one generic
//! message (see [`crate::domain::notice`]).

use axum::http::StatusCode;

/// Failure of a single webhook invocation.
///
/// # Status Mapping
///
/// | Variant                  | HTTP Status                |
/// |--------------------------|----------------------------|
/// | `UpstreamRejection`      | 200 OK (handled case)      |
/// | everything else          | 500 Internal Server Error  |
#[derive(Debug, thiserror::Error)]
pub enum WebhookError {
    /// The inbound envelope could not be parsed or lacks a required field.
    #[error("invalid webhook envelope: {0}")]
    Parse(String),

    /// The generation API refused the prompt (usually a safety-policy hit).
    #[error("generation rejected upstream: {0}")]
    UpstreamRejection(String),

    /// Transport failure or malformed response from the generation API.
    #[error("image generation failed: {0}")]
    GenerationFailure(String),

    /// Decoding, conversion, profile lookup, or record write failed.
    #[error("image materialization failed: {0}")]
    MaterializationFailure(String),

    /// Upload to the image host failed or returned no URL.
    #[error("image publish failed: {0}")]
    PublishFailure(String),

    /// A push message could not be delivered to the messaging platform.
    #[error("notification failed: {0}")]
    NotificationFailure(String),
}

impl WebhookError {
    /// Returns a stable short name used as the `kind` log field.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "ParseError",
            Self::UpstreamRejection(_) => "UpstreamRejection",
            Self::GenerationFailure(_) => "GenerationFailure",
            Self::MaterializationFailure(_) => "MaterializationFailure",
            Self::PublishFailure(_) => "PublishFailure",
            Self::NotificationFailure(_) => "NotificationFailure",
        }
    }

    /// Returns the HTTP status code reported to the invoking layer.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::UpstreamRejection(_) => StatusCode::OK,
            Self::Parse(_)
            | Self::GenerationFailure(_)
            | Self::MaterializationFailure(_)
            | Self::PublishFailure(_)
            | Self::NotificationFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
