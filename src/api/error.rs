use reqwest::StatusCode;
use thiserror::Error;

use crate::auth::AuthError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("Failed to decode response: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Authorization failed: {0}")]
    Auth(#[from] AuthError),

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}
