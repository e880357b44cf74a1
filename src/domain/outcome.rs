//! Terminal states of one webhook invocation.

use std::time::Duration;

use axum::http::StatusCode;

use crate::error::WebhookError;

/// How an invocation ended. Exactly one is produced per inbound envelope.
#[derive(Debug)]
pub enum Outcome {
    /// Image generated, published, and pushed to the user.
    NotifiedSuccess {
        /// Hosted image URL sent to the user.
        url: String,
        /// Whole seconds between acknowledgment and notification.
        elapsed_secs: u64,
    },
    /// The generation API refused the prompt and the user was told so.
    NotifiedRejected,
    /// Any other failure; the user received the generic error text.
    Failed(WebhookError),
}

impl Outcome {
    /// HTTP status reported for this outcome.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::NotifiedSuccess { .. } | Self::NotifiedRejected => StatusCode::OK,
            Self::Failed(err) => err.status_code(),
        }
    }

    /// Short label used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::NotifiedSuccess { .. } => "notified_success",
            Self::NotifiedRejected => "notified_rejected",
            Self::Failed(_) => "error",
        }
    }
}

/// Whole seconds in `elapsed`, rounded down.
#[must_use]
pub const fn whole_seconds(elapsed: Duration) -> u64 {
    elapsed.as_secs()
}
