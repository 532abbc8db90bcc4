//! RPC error types and their HTTP rendering.

use agora_governance::GovernanceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RpcError {
    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("server error: {0}")]
    Server(String),
}

/// JSON body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: &'static str,
    pub message: String,
}

impl RpcError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Governance(e) => match e {
                GovernanceError::NotFound { .. } => StatusCode::NOT_FOUND,
                GovernanceError::Unauthorized { .. } => StatusCode::FORBIDDEN,
                GovernanceError::InvalidState { .. } | GovernanceError::DuplicateVote { .. } => {
                    StatusCode::CONFLICT
                }
                GovernanceError::TooEarly { .. } | GovernanceError::TooLate { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                GovernanceError::ConfigurationMissing { .. }
                | GovernanceError::InvalidWindow { .. }
                | GovernanceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
                GovernanceError::Store(_) | GovernanceError::Codec(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Governance(e) => match e {
                GovernanceError::NotFound { .. } => "not_found",
                GovernanceError::Unauthorized { .. } => "unauthorized",
                GovernanceError::InvalidState { .. } => "invalid_state",
                GovernanceError::TooEarly { .. } => "too_early",
                GovernanceError::TooLate { .. } => "too_late",
                GovernanceError::DuplicateVote { .. } => "duplicate_vote",
                GovernanceError::ConfigurationMissing { .. } => "configuration_missing",
                GovernanceError::InvalidWindow { .. } => "invalid_window",
                GovernanceError::InvalidInput(_) => "invalid_input",
                GovernanceError::Store(_) | GovernanceError::Codec(_) => "internal",
            },
            Self::InvalidRequest(_) => "invalid_request",
            Self::Server(_) => "internal",
        }
    }
}

impl IntoResponse for RpcError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Internal details are logged where they occur: store and codec
        // failures by the engine, task failures by the handler.
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            "internal error".to_string()
        } else {
            self.to_string()
        };
        let body = ErrorBody {
            error: self.code(),
            message,
        };
        (status, Json(body)).into_response()
    }
}
