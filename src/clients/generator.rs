//! Image generation client (OpenAI Images API).

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{ClientError, read_json};

/// A successfully generated image, still base64-encoded.
#[derive(Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    /// Inline base64 image bytes.
    pub b64_json: String,
    /// Prompt as rewritten by the model, when the model reports one.
    pub revised_prompt: Option<String>,
    /// Creation time assigned by the generation service (unix seconds).
    pub created: i64,
}

impl fmt::Debug for GeneratedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedImage")
            .field("b64_json", &format_args!("<{} bytes>", self.b64_json.len()))
            .field("revised_prompt", &self.revised_prompt)
            .field("created", &self.created)
            .finish()
    }
}

/// Outcome of a generation request.
///
/// The API answers with either a `data` array or an `error` object; the two
/// are mutually exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationResponse {
    /// The `data` branch.
    Generated(GeneratedImage),
    /// The `error` branch, carrying the upstream message.
    Rejected(String),
}

impl GenerationResponse {
    /// Classifies a parsed response body.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingField`] when the body has neither
    /// `data` nor `error`, or when the `data` branch is incomplete.
    pub fn from_value(value: &Value) -> Result<Self, ClientError> {
        if let Some(data) = value.get("data") {
            let first = data
                .as_array()
                .and_then(|items| items.first())
                .ok_or(ClientError::MissingField("data[0]"))?;
            let b64_json = first
                .get("b64_json")
                .and_then(Value::as_str)
                .ok_or(ClientError::MissingField("data[0].b64_json"))?
                .to_string();
            let revised_prompt = first
                .get("revised_prompt")
                .and_then(Value::as_str)
                .map(str::to_string);
            let created = value
                .get("created")
                .and_then(Value::as_i64)
                .ok_or(ClientError::MissingField("created"))?;
            return Ok(Self::Generated(GeneratedImage {
                b64_json,
                revised_prompt,
                created,
            }));
        }

        if let Some(error) = value.get("error") {
            let message = error
                .get("message")
                .and_then(Value::as_str)
                .map_or_else(|| error.to_string(), str::to_string);
            return Ok(Self::Rejected(message));
        }

        Err(ClientError::MissingField("data"))
    }
}

/// Generates one image for a prompt.
#[async_trait]
pub trait ImageGenerator: Send + Sync + fmt::Debug {
    /// Requests a single image for `prompt`.
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ClientError>;
}

/// Request body for `POST /v1/images/generations`.
#[derive(Debug, Serialize)]
struct ImageGenerationRequest<'a> {
    prompt: &'a str,
    model: &'a str,
    n: u8,
    quality: &'a str,
    response_format: &'a str,
    size: &'a str,
    style: &'a str,
}

/// Error object returned by the API, used only for logging.
#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<String>,
}

/// [`ImageGenerator`] backed by the OpenAI Images API.
#[derive(Debug, Clone)]
pub struct OpenAiImageGenerator {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl OpenAiImageGenerator {
    /// Creates a generator targeting `{base_url}/v1/images/generations`.
    #[must_use]
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            endpoint: format!("{base_url}/v1/images/generations"),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, prompt: &str) -> Result<GenerationResponse, ClientError> {
        let request = ImageGenerationRequest {
            prompt,
            model: &self.model,
            n: 1,
            quality: "standard",
            response_format: "b64_json",
            size: "1024x1024",
            style: "vivid",
        };

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = read_json(response).await?;
        let parsed = GenerationResponse::from_value(&body)?;

        match &parsed {
            GenerationResponse::Generated(image) => {
                tracing::debug!(status, created = image.created, revised_prompt = ?image.revised_prompt, "generation response");
            }
            GenerationResponse::Rejected(message) => {
                let code = body
                    .get("error")
                    .cloned()
                    .and_then(|e| serde_json::from_value::<ApiErrorBody>(e).ok())
                    .and_then(|e| e.code);
                tracing::debug!(status, ?code, message = %message, "generation rejected");
            }
        }

        Ok(parsed)
    }
}
