use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tokio::task::JoinError;
use tracing::error;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Battle not found")]
    NotFound,

    #[error("Invalid option")]
    InvalidOption,

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Voting has closed")]
    VotingClosed,

    #[error("Already voted")]
    DuplicateVote,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[from] StoreError),

    #[error("Internal error: {0}")]
    InternalError(#[from] JoinError),
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest(rejection.body_text())
    }
}

// A path segment that is not a battle id cannot name a battle.
impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        AppError::NotFound
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::InvalidOption | AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::VotingClosed => StatusCode::FORBIDDEN,
            AppError::DuplicateVote => StatusCode::CONFLICT,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::StorageUnavailable(ref e) => {
                error!("Storage failure: {e}");
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::InternalError(ref e) => {
                error!("Request task failed: {e}");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
