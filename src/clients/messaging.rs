//! Messaging platform client (LINE Messaging API): profile lookup and push.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ClientError, ensure_success};
use crate::domain::UserId;

/// One message in a push request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PushMessage {
    /// Plain text.
    Text {
        /// Message body.
        text: String,
    },
    /// Image referenced by URL.
    Image {
        /// Full-size image URL.
        #[serde(rename = "originalContentUrl")]
        original_content_url: String,
        /// Preview image URL.
        #[serde(rename = "previewImageUrl")]
        preview_image_url: String,
    },
}

impl PushMessage {
    /// Builds a text message.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Builds an image message using `url` for both preview and full content.
    #[must_use]
    pub fn image(url: &str) -> Self {
        Self::Image {
            original_content_url: url.to_string(),
            preview_image_url: url.to_string(),
        }
    }
}

/// Profile lookup and one-way push delivery.
#[async_trait]
pub trait MessagingClient: Send + Sync + fmt::Debug {
    /// Returns the display name of `user_id`.
    async fn display_name(&self, user_id: &UserId) -> Result<String, ClientError>;

    /// Pushes `messages` to `to` in a single request.
    async fn push(&self, to: &UserId, messages: Vec<PushMessage>) -> Result<(), ClientError>;
}

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    to: &'a str,
    messages: Vec<PushMessage>,
}

#[derive(Debug, Deserialize)]
struct ProfileResponse {
    #[serde(rename = "displayName", default)]
    display_name: Option<String>,
}

/// [`MessagingClient`] backed by the LINE Messaging API.
#[derive(Debug, Clone)]
pub struct LineMessagingClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl LineMessagingClient {
    /// Creates a client targeting `{base_url}/v2/bot/...`.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, access_token: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.to_string(),
            access_token: access_token.into(),
        }
    }
}

impl LineMessagingClient {
    /// Profile endpoint for `user_id`, with the id percent-encoded as a
    /// single path segment.
    fn profile_url(&self, user_id: &UserId) -> Result<reqwest::Url, ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {e}", self.base_url)))?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidUrl(format!("{} cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(["v2", "bot", "profile", user_id.as_str()]);
        Ok(url)
    }
}

#[async_trait]
impl MessagingClient for LineMessagingClient {
    async fn display_name(&self, user_id: &UserId) -> Result<String, ClientError> {
        let url = self.profile_url(user_id)?;
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await?;
        let response = ensure_success(response).await?;
        let profile: ProfileResponse = response
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        profile
            .display_name
            .ok_or(ClientError::MissingField("displayName"))
    }

    async fn push(&self, to: &UserId, messages: Vec<PushMessage>) -> Result<(), ClientError> {
        let url = format!("{}/v2/bot/message/push", self.base_url);
        let count = messages.len();
        let request = PushRequest {
            to: to.as_str(),
            messages,
        };
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&request)
            .send()
            .await?;
        ensure_success(response).await?;
        tracing::debug!(user_id = %to, count, "push delivered");
        Ok(())
    }
}
