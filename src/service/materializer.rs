//! Turns a generated image into an uploadable PNG and a stored record.

use std::sync::Arc;

use crate::clients::{GeneratedImage, MessagingClient};
use crate::domain::{GenerationRecord, UserId};
use crate::error::WebhookError;
use crate::imaging::{ConvertedImage, convert_b64_to_png};
use crate::persistence::GenerationStore;

/// Decodes and converts generated images, then records their metadata.
///
/// The display name is looked up on every call; nothing is cached.
#[derive(Debug, Clone)]
pub struct Materializer {
    messaging: Arc<dyn MessagingClient>,
    store: Arc<dyn GenerationStore>,
}

impl Materializer {
    /// Creates a materializer writing through `store`.
    #[must_use]
    pub fn new(messaging: Arc<dyn MessagingClient>, store: Arc<dyn GenerationStore>) -> Self {
        Self { messaging, store }
    }

    /// Converts `image` to PNG and writes its [`GenerationRecord`].
    ///
    /// A record that was written stays written even if a later step of the
    /// invocation fails.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::MaterializationFailure`] if decoding,
    /// conversion, the profile lookup, or the write fails.
    pub async fn materialize(
        &self,
        image: &GeneratedImage,
        user_id: &UserId,
        prompt: &str,
    ) -> Result<ConvertedImage, WebhookError> {
        let converted = convert_b64_to_png(&image.b64_json, image.created)
            .map_err(|e| WebhookError::MaterializationFailure(e.to_string()))?;

        let user_name = self
            .messaging
            .display_name(user_id)
            .await
            .map_err(|e| WebhookError::MaterializationFailure(format!("profile lookup: {e}")))?;

        let record = GenerationRecord {
            user_id: user_id.clone(),
            user_name,
            timestamp: image.created,
            user_prompt: prompt.to_string(),
            revised_prompt: image
                .revised_prompt
                .clone()
                .unwrap_or_else(|| prompt.to_string()),
        };
        self.store
            .put(&record)
            .await
            .map_err(|e| WebhookError::MaterializationFailure(e.to_string()))?;

        tracing::info!(
            user_id = %user_id,
            timestamp = image.created,
            size = converted.bytes.len(),
            "image materialized"
        );
        Ok(converted)
    }
}
