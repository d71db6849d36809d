use serde::Deserialize;
use thiserror::Error;

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Fallback when the backend body carries no usable detail
const GENERIC_MESSAGE: &str = "Request failed";

#[derive(Error, Debug)]
pub enum ApiError {
    /// Input rejected by field-level validation, client- or backend-side
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Access rejected and the token refresh did not recover it
    #[error("Not authenticated - please log in again")]
    Unauthenticated,

    #[error("Request failed with status {status}: {message}")]
    Request { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

impl ApiError {
    /// Truncate a response body to avoid carrying excessive data.
    /// The cut point backs up to a char boundary so multibyte bodies
    /// cannot panic the slice.
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            return body.to_string();
        }
        let mut end = MAX_ERROR_BODY_LENGTH;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!(
            "{}... (truncated, {} total bytes)",
            &body[..end],
            body.len()
        )
    }

    /// Extract the backend's `{"detail": ...}` message where present,
    /// otherwise fall back to the (truncated) raw body or a generic message.
    pub(crate) fn detail_from_body(body: &str) -> String {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(parsed) => parsed.detail,
            Err(_) if body.trim().is_empty() => GENERIC_MESSAGE.to_string(),
            Err(_) => Self::truncate_body(body),
        }
    }

    /// Map a non-2xx gateway response. A 401 reaching this point is final:
    /// the gateway's refresh-and-retry has already been spent or skipped.
    pub(crate) fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        match status.as_u16() {
            401 => ApiError::Unauthenticated,
            _ => ApiError::Request {
                status: status.as_u16(),
                message: Self::detail_from_body(body),
            },
        }
    }
}
