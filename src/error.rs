use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error object the processor returns under the top level `error` key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub param: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    pub error: ApiErrorBody,
}

/// Everything that can go wrong between the gateway and the processor.
///
/// Variants carry raw facts only (HTTP status, processor error body, the
/// transport failure). Mapping them to a user facing class happens in
/// [`crate::services::error_class`].
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("processor returned HTTP {status}: {}", describe(.body))]
    Api {
        status: u16,
        request_id: Option<String>,
        body: Option<ApiErrorBody>,
    },

    #[error("network communication with processor failed: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("invalid request: {0}")]
    Validation(String),

    #[error("could not decode processor response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("unexpected failure: {0}")]
    Unexpected(String),
}

fn describe(body: &Option<ApiErrorBody>) -> &str {
    body.as_ref()
        .and_then(|b| b.message.as_deref())
        .unwrap_or("no error message")
}

impl ProcessorError {
    pub fn http_status(&self) -> Option<u16> {
        match self {
            ProcessorError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn request_id(&self) -> Option<&str> {
        match self {
            ProcessorError::Api { request_id, .. } => request_id.as_deref(),
            _ => None,
        }
    }

    pub fn body(&self) -> Option<&ApiErrorBody> {
        match self {
            ProcessorError::Api { body, .. } => body.as_ref(),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ProcessorError {
    fn from(err: reqwest::Error) -> Self {
        // Builder and redirect failures happen before or instead of talking
        // to the processor; only the rest are network trouble.
        if err.is_builder() || err.is_redirect() {
            return ProcessorError::Unexpected(err.to_string());
        }
        ProcessorError::Transport(Box::new(err))
    }
}
