use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::services::{
    error_classifier::classify, providers::ProviderError, sanitizer::ValidationError,
};

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Provider output was malformed; the message names what was wrong
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Provider call failed: {0}")]
    ProviderCallFailed(ProviderError),

    #[error("Authentication failed: {0}")]
    Authentication(ProviderError),

    #[error("Rate limited: {0}")]
    RateLimited(ProviderError),

    #[error("Billing error: {0}")]
    Billing(ProviderError),
}

impl From<ProviderError> for AppError {
    fn from(err: ProviderError) -> Self {
        classify(err)
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::Authentication(_) => StatusCode::UNAUTHORIZED,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::Billing(_) => StatusCode::PAYMENT_REQUIRED,
            AppError::Validation(_) | AppError::ProviderCallFailed(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message safe to show the client; provider detail stays in the logs
    pub fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(msg) => msg.clone(),
            AppError::Validation(e) => e.to_string(),
            AppError::Authentication(_) => "Invalid or missing API key".to_string(),
            AppError::RateLimited(_) => "Too many requests, please try again later".to_string(),
            AppError::Billing(e) => {
                format!("{} billing error - please check your account", e.provider)
            }
            AppError::ProviderCallFailed(_) => {
                "Failed to generate travel recommendations".to_string()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }

        let body = Json(json!({
            "error": self.client_message()
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
