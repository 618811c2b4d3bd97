//! Error types for the HTTP server and their JSON payloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use parley_core::ChatError;
use serde_json::{json, Value};
use thiserror::Error;

/// Result type alias for server operations.
pub type Result<T> = std::result::Result<T, ServerError>;

#[derive(Error, Debug)]
pub enum ServerError {
    /// Body was not valid JSON or had the wrong shape
    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    /// A required field was missing or blank; carries the user-facing message
    #[error("{0}")]
    MissingField(&'static str),

    #[error("Error processing request: {0}")]
    SendText(ChatError),

    #[error("Error summarizing URL: {0}")]
    Summarize(ChatError),

    #[error("Error searching for events: {0}")]
    Search(ChatError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ServerError::InvalidBody(_) | ServerError::MissingField(_) => 400,
            ServerError::SendText(_)
            | ServerError::Summarize(_)
            | ServerError::Search(_)
            | ServerError::Io(_)
            | ServerError::Config(_)
            | ServerError::Internal(_) => 500,
        }
    }

    pub fn error_type(&self) -> &'static str {
        match self {
            ServerError::InvalidBody(_) => "invalid_body",
            ServerError::MissingField(_) => "missing_field",
            ServerError::SendText(_) => "chat_error",
            ServerError::Summarize(_) => "summarize_error",
            ServerError::Search(_) => "search_error",
            ServerError::Io(_) => "io_error",
            ServerError::Config(_) => "config_error",
            ServerError::Internal(_) => "internal_error",
        }
    }

    /// JSON body sent to the client: `{error, message?}`.
    pub fn payload(&self) -> Value {
        match self {
            ServerError::InvalidBody(message) => json!({
                "error": "Invalid request body",
                "message": message,
            }),
            ServerError::MissingField(message) => json!({ "error": message }),
            // Chat failures are reported without detail
            ServerError::SendText(_) => json!({ "error": "Error processing request" }),
            ServerError::Summarize(source) => json!({
                "error": "Error summarizing URL",
                "message": source.to_string(),
            }),
            ServerError::Search(source) => {
                let message = match source {
                    ChatError::Search(inner) => inner.to_string(),
                    other => other.to_string(),
                };
                json!({
                    "error": "Error searching for events",
                    "message": message,
                })
            }
            other => json!({
                "error": "Internal server error",
                "message": other.to_string(),
            }),
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            log::error!("{} ({})", self, self.error_type());
        } else {
            log::warn!("{} ({})", self, self.error_type());
        }
        (status, Json(self.payload())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::SearchError;

    #[test]
    fn test_payloads() {
        let err = ServerError::MissingField("URL is required");
        assert_eq!(err.status_code(), 400);
        assert_eq!(err.payload(), json!({"error": "URL is required"}));

        let err = ServerError::SendText(ChatError::LLMError("boom".to_string()));
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.payload(), json!({"error": "Error processing request"}));

        let err = ServerError::Summarize(ChatError::Summarize(
            "LLM interaction failed: boom".to_string(),
        ));
        assert_eq!(
            err.payload()["message"],
            "Failed to summarize the provided URL: LLM interaction failed: boom"
        );

        let err = ServerError::Search(ChatError::Search(SearchError::NotConfigured));
        assert_eq!(
            err.payload(),
            json!({"error": "Error searching for events", "message": "Search is not configured"})
        );
    }
}
