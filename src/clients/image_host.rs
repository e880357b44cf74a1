//! Image host client (Gyazo upload API).

use std::fmt;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::{ClientError, read_json};
use crate::imaging::ConvertedImage;

/// Publishes an image and returns its shareable URL.
#[async_trait]
pub trait ImageHost: Send + Sync + fmt::Debug {
    /// Uploads `image` and returns the hosted URL.
    async fn upload(&self, image: &ConvertedImage) -> Result<String, ClientError>;
}

/// [`ImageHost`] backed by the Gyazo upload endpoint.
#[derive(Debug, Clone)]
pub struct GyazoImageHost {
    http: reqwest::Client,
    endpoint: String,
    access_token: String,
}

impl GyazoImageHost {
    /// Creates a host targeting `{base_url}/api/upload`.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: &str, access_token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: format!("{base_url}/api/upload"),
            access_token: access_token.into(),
        }
    }
}

#[async_trait]
impl ImageHost for GyazoImageHost {
    async fn upload(&self, image: &ConvertedImage) -> Result<String, ClientError> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(image.mime_type)?;
        let form = Form::new()
            .text("access_token", self.access_token.clone())
            .text("app", "Gyazo")
            .text("title", image.file_name.clone())
            .part("imagedata", part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;
        // The status is not checked: a usable answer always carries `url`.
        let body = read_json(response).await?;
        body.get("url")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or(ClientError::MissingField("url"))
    }
}
