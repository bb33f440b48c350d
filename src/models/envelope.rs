use serde::{Deserialize, Serialize};

use crate::error::{ApiErrorBody, ProcessorError};
use crate::services::error_class::ErrorClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BilingualMessage {
    pub en: String,
    pub ar: String,
}

impl BilingualMessage {
    pub fn new(en: &str, ar: &str) -> Self {
        Self {
            en: en.to_string(),
            ar: ar.to_string(),
        }
    }
}

/// Uniform result of every gateway operation.
///
/// `data` is set on success, `error` on failure; `message` always is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub status: bool,
    pub data: Option<T>,
    pub message: BilingualMessage,
    pub error: Option<ErrorPayload>,
}

impl<T> Envelope<T> {
    pub fn success(data: T, message: BilingualMessage) -> Self {
        Self {
            status: true,
            data: Some(data),
            message,
            error: None,
        }
    }

    pub fn failure(error: &ProcessorError) -> Self {
        let class = ErrorClass::classify(error);
        Self {
            status: false,
            data: None,
            message: class.message(),
            error: Some(ErrorPayload::new(class, error)),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status
    }

    /// Class of the failure, `None` on success.
    pub fn error_class(&self) -> Option<ErrorClass> {
        match &self.error {
            Some(ErrorPayload::Card(_)) => Some(ErrorClass::CardError),
            Some(ErrorPayload::Raw(raw)) => Some(raw.kind),
            None => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ErrorPayload {
    Card(CardErrorDetails),
    Raw(RawError),
}

impl ErrorPayload {
    fn new(class: ErrorClass, error: &ProcessorError) -> Self {
        match (class, error) {
            // Without a decodable error object there are no decline details to
            // report, so the raw view is used instead.
            (ErrorClass::CardError, ProcessorError::Api { status, body: Some(body), .. }) => {
                ErrorPayload::Card(CardErrorDetails::new(*status, body))
            }
            _ => ErrorPayload::Raw(RawError::new(class, error)),
        }
    }
}

const UNKNOWN: &str = "unknown";

/// Structured decline details exposed for card failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardErrorDetails {
    pub status: u16,
    #[serde(rename = "type")]
    pub error_type: String,
    pub code: String,
    pub param: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_code: Option<String>,
}

impl CardErrorDetails {
    /// Fields the processor left out are reported as `"unknown"`.
    fn new(status: u16, body: &ApiErrorBody) -> Self {
        let body = body.clone();
        let unknown = || UNKNOWN.to_string();
        Self {
            status,
            error_type: body.error_type.unwrap_or_else(unknown),
            code: body.code.unwrap_or_else(unknown),
            param: body.param,
            message: body.message.unwrap_or_else(unknown),
            decline_code: body.decline_code,
        }
    }
}

/// Diagnostic view of any non-card failure. Never carries credentials or
/// card data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawError {
    pub kind: ErrorClass,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<ApiErrorBody>,
}

impl RawError {
    fn new(kind: ErrorClass, error: &ProcessorError) -> Self {
        Self {
            kind,
            message: error.to_string(),
            http_status: error.http_status(),
            request_id: error.request_id().map(str::to_string),
            body: error.body().cloned(),
        }
    }
}
