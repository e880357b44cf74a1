//! Response envelope returned to the invoking layer.

use std::collections::BTreeMap;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::Outcome;
use crate::domain::notice;

/// Proxy-style response envelope, one per invocation.
///
/// ```json
/// { "isBase64Encoded": false, "statusCode": 200, "headers": {}, "body": "" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseEnvelope {
    /// Always `false`: bodies are plain text.
    pub is_base64_encoded: bool,
    /// `200` for handled outcomes, `500` for failures.
    pub status_code: u16,
    /// Extra response headers (none are set).
    pub headers: BTreeMap<String, String>,
    /// `""` on success and rejection, `"Error"` on failure.
    pub body: String,
}

impl ResponseEnvelope {
    fn with(status: StatusCode, body: &str) -> Self {
        Self {
            is_base64_encoded: false,
            status_code: status.as_u16(),
            headers: BTreeMap::new(),
            body: body.to_string(),
        }
    }
}

impl From<&Outcome> for ResponseEnvelope {
    fn from(outcome: &Outcome) -> Self {
        let status = outcome.status_code();
        let body = if status.is_success() {
            notice::OK_BODY
        } else {
            notice::ERROR_BODY
        };
        Self::with(status, body)
    }
}

impl IntoResponse for ResponseEnvelope {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, self.body).into_response();
        for (name, value) in &self.headers {
            if let (Ok(name), Ok(value)) = (
                HeaderName::try_from(name.as_str()),
                HeaderValue::try_from(value.as_str()),
            ) {
                response.headers_mut().insert(name, value);
            }
        }
        response
    }
}
