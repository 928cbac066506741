//! Error taxonomy for hub API operations.
//!
//! Stores catch [`ApiError`]s at the request boundary, record a
//! serializable [`ErrorPayload`] in their state, and surface a transient
//! notice. Nothing here is fatal to the process; the worst case is a
//! forced logout.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the hub API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The access credential was rejected (401) and the request has not
    /// been retried yet. Handled inside the transport; callers normally
    /// never see this variant.
    #[error("access credential expired")]
    AuthExpired,

    /// Refreshing the session failed, or a retried request was rejected
    /// again. The session has been logged out.
    #[error("authentication failed; session cleared")]
    AuthFailure,

    /// The server rejected the request (4xx) with a field-error payload.
    #[error("validation error: {0}")]
    Validation(ErrorPayload),

    /// Single-resource fetch came back 404.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP request failed before a response arrived.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body was not the expected JSON shape.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Any other non-success response (5xx, unexpected shapes).
    #[error("unexpected response ({status}): {message}")]
    Unexpected {
        /// HTTP status code.
        status: u16,
        /// Truncated response body for diagnostics.
        message: String,
    },
}

impl ApiError {
    /// Convert into the serializable payload stores keep in state.
    ///
    /// Server-supplied payloads (validation errors) are surfaced as-is;
    /// everything else collapses to the store's generic fallback message,
    /// matching what a user should actually see.
    #[must_use]
    pub fn to_payload(&self, fallback: &str) -> ErrorPayload {
        match self {
            Self::Validation(payload) => payload.clone(),
            Self::NotFound(resource) => ErrorPayload::message(format!("Not found: {resource}")),
            _ => ErrorPayload::message(fallback),
        }
    }

    /// Whether this error means the session is gone and the consumer
    /// should return to the login entry point.
    #[must_use]
    pub const fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthFailure)
    }
}

/// Serializable error payload kept in store state.
///
/// `detail` carries the server's error body verbatim when one was
/// provided (field errors from validation, `{"error": ...}` objects);
/// `message` is always present and safe to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    /// Human-readable summary.
    pub message: String,
    /// Raw server error body, if the server supplied one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl ErrorPayload {
    /// Payload with a message only.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: None,
        }
    }

    /// Build a payload from a raw error response body.
    ///
    /// If the body parses as JSON it is kept verbatim in `detail`, and the
    /// message is pulled from the conventional `detail`/`error` keys when
    /// present. A non-JSON body falls back to the generic message.
    #[must_use]
    pub fn from_body(body: &str, fallback: &str) -> Self {
        match serde_json::from_str::<serde_json::Value>(body) {
            Ok(value) => {
                let message = value
                    .get("detail")
                    .or_else(|| value.get("error"))
                    .and_then(serde_json::Value::as_str)
                    .unwrap_or(fallback)
                    .to_string();
                Self {
                    message,
                    detail: Some(value),
                }
            }
            Err(_) => Self::message(fallback),
        }
    }
}

impl std::fmt::Display for ErrorPayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Result type alias for hub API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_from_json_body_keeps_detail() {
        let payload = ErrorPayload::from_body(r#"{"quantity":["must be >= 1"]}"#, "Add failed");
        assert_eq!(payload.message, "Add failed");
        assert!(payload.detail.is_some());
    }

    #[test]
    fn test_payload_prefers_server_detail_message() {
        let payload = ErrorPayload::from_body(r#"{"detail":"Cart is empty"}"#, "Checkout failed");
        assert_eq!(payload.message, "Cart is empty");
    }

    #[test]
    fn test_payload_from_non_json_body() {
        let payload = ErrorPayload::from_body("<html>502</html>", "Something broke");
        assert_eq!(payload.message, "Something broke");
        assert!(payload.detail.is_none());
    }

    #[test]
    fn test_validation_error_surfaced_as_is() {
        let server = ErrorPayload::from_body(r#"{"error":"Quantity must be greater than 0"}"#, "x");
        let err = ApiError::Validation(server.clone());
        assert_eq!(err.to_payload("generic"), server);
    }

    #[test]
    fn test_network_error_collapses_to_fallback() {
        let err = ApiError::Unexpected {
            status: 502,
            message: "bad gateway".to_string(),
        };
        assert_eq!(
            err.to_payload("Failed to fetch cart").message,
            "Failed to fetch cart"
        );
    }
}
