//! Errors surfaced at the HTTP boundary.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Only POST allowed")]
    MethodNotAllowed,

    #[error("Too many requests, slow down a bit.")]
    RateLimited,

    #[error("{0}")]
    InvalidInput(String),

    /// The model call failed or its output could not be used.
    #[error("{message}")]
    UpstreamFailure {
        message: String,
        raw: Option<String>,
        detail: Option<String>,
    },

    #[error("Server error")]
    Internal(String),
}

impl ChatError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::UpstreamFailure {
            message: message.into(),
            raw: None,
            detail: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InvalidInput(_) => StatusCode::BAD_REQUEST,
            Self::UpstreamFailure { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.to_string();
        let (raw, detail) = match self {
            Self::UpstreamFailure { raw, detail, .. } => (raw, detail),
            Self::Internal(detail) => (None, Some(detail)),
            _ => (None, None),
        };

        (status, Json(ErrorBody { error, raw, detail })).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(ChatError::MethodNotAllowed.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(ChatError::RateLimited.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(ChatError::invalid_input("x").status(), StatusCode::BAD_REQUEST);
        assert_eq!(ChatError::upstream("x").status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ChatError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn internal_error_hides_detail_in_message() {
        let err = ChatError::Internal("encoder exploded".into());
        assert_eq!(err.to_string(), "Server error");
    }
}
