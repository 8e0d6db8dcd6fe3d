//! Error types for the probe pipeline.
//!
//! Every failure of a single scrape is terminal for that scrape: it is
//! converted to an HTTP 500 with a plaintext body at the handler boundary
//! and never retried.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Failure modes of one `/probe` scrape.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// The device could not be reached (connect, transport or timeout error).
    #[error("Failed to get status from Shelly device")]
    Fetch(#[source] reqwest::Error),

    /// The device answered, but not with HTTP 200.
    #[error("Non-OK HTTP status: {0}")]
    UpstreamStatus(reqwest::StatusCode),

    /// The status payload was not valid JSON of the expected shape.
    #[error("Failed to unmarshal JSON response")]
    Decode(#[source] serde_json::Error),

    /// Registering or encoding the request-scoped metrics failed.
    #[error("Failed to encode metrics")]
    Render(#[from] prometheus::Error),
}

impl IntoResponse for ProbeError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upstream_status_message_includes_status_text() {
        let err = ProbeError::UpstreamStatus(reqwest::StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Non-OK HTTP status: 404 Not Found");
    }

    #[test]
    fn test_decode_message_is_generic() {
        let source = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let err = ProbeError::Decode(source);
        assert_eq!(err.to_string(), "Failed to unmarshal JSON response");
    }
}
