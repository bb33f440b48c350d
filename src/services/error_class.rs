use serde::{Deserialize, Serialize};

use crate::error::ProcessorError;
use crate::models::envelope::BilingualMessage;

/// User facing failure classes, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    CardError,
    RateLimited,
    InvalidRequest,
    AuthenticationFailed,
    NetworkFailure,
    GenericApiError,
    Unclassified,
}

type Predicate = fn(&ProcessorError) -> bool;

// Order matters: the first matching predicate wins and anything left over
// is `Unclassified`.
const DISPATCH: [(ErrorClass, Predicate); 6] = [
    (ErrorClass::CardError, is_card_error),
    (ErrorClass::RateLimited, is_rate_limited),
    (ErrorClass::InvalidRequest, is_invalid_request),
    (ErrorClass::AuthenticationFailed, is_authentication_failure),
    (ErrorClass::NetworkFailure, is_network_failure),
    (ErrorClass::GenericApiError, is_api_error),
];

impl ErrorClass {
    pub fn classify(error: &ProcessorError) -> Self {
        DISPATCH
            .iter()
            .find(|(_, matches)| matches(error))
            .map(|(class, _)| *class)
            .unwrap_or(ErrorClass::Unclassified)
    }

    pub fn message(self) -> BilingualMessage {
        let (en, ar) = match self {
            ErrorClass::CardError => ("Invalid Card", "بطاقة غير صالحة"),
            ErrorClass::RateLimited => (
                "Too many requests made to the API too quickly",
                "تم تقديم طلبات كثيرة جدًا إلى واجهة برمجة التطبيقات بسرعة كبيرة جدًا",
            ),
            ErrorClass::InvalidRequest => (
                "Invalid parameters were supplied to processor's API",
                "تم توفير معلمات غير صالحة لواجهة برمجة تطبيقات المعالج",
            ),
            ErrorClass::AuthenticationFailed => (
                "Authentication with processor's API failed (maybe you changed API keys recently)",
                "فشلت المصادقة مع واجهة برمجة تطبيقات المعالج (ربما قمت بتغيير مفاتيح API مؤخرًا)",
            ),
            ErrorClass::NetworkFailure => (
                "Network communication with processor failed",
                "فشل اتصال الشبكة مع المعالج",
            ),
            ErrorClass::GenericApiError => (
                "Something went wrong with the payment processor, please try again later",
                "حدث خطأ لدى معالج الدفع، يرجى المحاولة لاحقًا",
            ),
            ErrorClass::Unclassified => ("Something happened Error", "حدث شيء خطأ"),
        };
        BilingualMessage::new(en, ar)
    }
}

fn error_type(error: &ProcessorError) -> Option<&str> {
    error.body().and_then(|b| b.error_type.as_deref())
}

fn error_code(error: &ProcessorError) -> Option<&str> {
    error.body().and_then(|b| b.code.as_deref())
}

fn is_card_error(error: &ProcessorError) -> bool {
    error.http_status() == Some(402)
}

fn is_rate_limited(error: &ProcessorError) -> bool {
    error.http_status() == Some(429)
        || matches!(error_code(error), Some("rate_limit") | Some("lock_timeout"))
}

fn is_invalid_request(error: &ProcessorError) -> bool {
    match error {
        ProcessorError::Validation(_) => true,
        // Idempotency conflicts come back as 400 but are not a parameter problem.
        ProcessorError::Api { status: 400, .. } => error_type(error) != Some("idempotency_error"),
        ProcessorError::Api { status: 404, .. } => true,
        _ => false,
    }
}

// 401 bodies carry `invalid_request_error` as their type, so this is keyed
// on status only and must stay after the card and rate limit checks.
fn is_authentication_failure(error: &ProcessorError) -> bool {
    error.http_status() == Some(401)
}

fn is_network_failure(error: &ProcessorError) -> bool {
    matches!(error, ProcessorError::Transport(_))
}

fn is_api_error(error: &ProcessorError) -> bool {
    matches!(error, ProcessorError::Api { .. })
}
