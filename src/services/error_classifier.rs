use axum::http::StatusCode;

use crate::{error::AppError, services::providers::ProviderError};

/// Client-facing categories for provider failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Authentication,
    RateLimited,
    Billing,
    Unknown,
}

impl ErrorClass {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorClass::Authentication => StatusCode::UNAUTHORIZED,
            ErrorClass::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ErrorClass::Billing => StatusCode::PAYMENT_REQUIRED,
            ErrorClass::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Substring rules tried in order against the lowercased message; first match wins
const RULES: &[(&str, ErrorClass)] = &[
    ("api_key", ErrorClass::Authentication),
    ("api key", ErrorClass::Authentication),
    ("rate_limit", ErrorClass::RateLimited),
    ("rate limit", ErrorClass::RateLimited),
    ("resource_exhausted", ErrorClass::RateLimited),
    ("billing", ErrorClass::Billing),
    ("insufficient_quota", ErrorClass::Billing),
];

/// Classifies a provider failure
///
/// Message rules run first: OpenAI reports an exhausted quota as HTTP 429 with
/// `insufficient_quota`, which is a billing problem rather than throttling. The
/// HTTP status only decides when no rule matches.
pub fn classify_error(err: &ProviderError) -> ErrorClass {
    match classify_message(&err.message) {
        ErrorClass::Unknown => classify_status(err.status),
        class => class,
    }
}

fn classify_status(status: Option<u16>) -> ErrorClass {
    match status {
        Some(401) | Some(403) => ErrorClass::Authentication,
        Some(402) => ErrorClass::Billing,
        Some(429) => ErrorClass::RateLimited,
        _ => ErrorClass::Unknown,
    }
}

/// Ordered substring rules over the provider message
pub fn classify_message(message: &str) -> ErrorClass {
    let message = message.to_lowercase();
    RULES
        .iter()
        .find(|(pattern, _)| message.contains(pattern))
        .map(|(_, class)| *class)
        .unwrap_or(ErrorClass::Unknown)
}

/// Maps a provider failure onto the application error taxonomy
pub fn classify(err: ProviderError) -> AppError {
    match classify_error(&err) {
        ErrorClass::Authentication => AppError::Authentication(err),
        ErrorClass::RateLimited => AppError::RateLimited(err),
        ErrorClass::Billing => AppError::Billing(err),
        ErrorClass::Unknown => AppError::ProviderCallFailed(err),
    }
}
