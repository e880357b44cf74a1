//! Inbound webhook envelope and the message extracted from it.
//!
//! The messaging platform posts an envelope with an `events` array. Only
//! the first event is processed; its `message.text` and `source.userId`
//! are all the service consumes.

use serde::Deserialize;
use serde_json::Value;

use super::UserId;
use crate::error::WebhookError;

/// Raw webhook body as posted by the messaging platform.
///
/// Events are kept as untyped JSON: only `events[0]` is ever read, so a
/// malformed later event must not make the envelope unusable.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookEnvelope {
    /// Events delivered in this callback.
    #[serde(default)]
    pub events: Vec<Value>,
}

impl WebhookEnvelope {
    /// Parses a raw request body.
    ///
    /// # Errors
    ///
    /// Returns [`WebhookError::Parse`] if the body is not a JSON object
    /// whose `events`, when present, is an array.
    pub fn from_body(body: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(body).map_err(|e| WebhookError::Parse(e.to_string()))
    }

    /// Sender of the first event, if one is present.
    ///
    /// Read independently of the message text, so that a failure can
    /// still be reported to the user.
    #[must_use]
    pub fn first_sender(&self) -> Option<UserId> {
        self.events
            .first()
            .and_then(|event| event.get("source"))
            .and_then(|source| source.get("userId"))
            .and_then(Value::as_str)
            .map(UserId::from)
    }

    /// Text of the first event's message, if it is a string.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.events
            .first()
            .and_then(|event| event.get("message"))
            .and_then(|message| message.get("text"))
            .and_then(Value::as_str)
    }
}

/// A prompt submitted by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender.
    pub user_id: UserId,
    /// Message text, used verbatim as the generation prompt.
    pub text: String,
}

impl TryFrom<&WebhookEnvelope> for InboundMessage {
    type Error = WebhookError;

    fn try_from(envelope: &WebhookEnvelope) -> Result<Self, Self::Error> {
        if envelope.events.is_empty() {
            return Err(WebhookError::Parse("envelope has no events".to_string()));
        }
        let user_id = envelope
            .first_sender()
            .ok_or_else(|| WebhookError::Parse("missing events[0].source.userId".to_string()))?;
        let text = envelope
            .first_text()
            .ok_or_else(|| WebhookError::Parse("missing events[0].message.text".to_string()))?
            .to_string();
        Ok(Self { user_id, text })
    }
}
