//! Error types for the action service.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use std::fmt;

/// Service error type.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Configuration error (bad catalog entry, program id, commitment...).
    Config(String),
    /// Missing or malformed request parameter.
    InvalidInput(String),
    /// Requested order does not exist.
    NotFound(String),
    /// RPC or marketplace client failure.
    Upstream(String),
    /// A marketplace call did not finish in time.
    Timeout(String),
}

impl Error {
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Error::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Upstream(_) => StatusCode::BAD_GATEWAY,
            Error::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Short reason returned to the client. Upstream details stay in the logs.
    pub fn reason(&self) -> String {
        match self {
            Error::InvalidInput(msg) | Error::NotFound(msg) => msg.clone(),
            Error::Upstream(_) => "Marketplace temporarily unavailable".into(),
            Error::Timeout(_) => "Marketplace request timed out".into(),
            Error::Config(_) => "Service misconfigured".into(),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Config(msg) => write!(f, "config error: {msg}"),
            Error::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Error::NotFound(msg) => write!(f, "not found: {msg}"),
            Error::Upstream(msg) => write!(f, "upstream error: {msg}"),
            Error::Timeout(msg) => write!(f, "timeout: {msg}"),
        }
    }
}

impl std::error::Error for Error {}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.reason() });
        (self.status(), Json(body)).into_response()
    }
}
