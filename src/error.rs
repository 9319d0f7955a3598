//! Error types for the catalog and the HTTP/WS surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::question::{preview::PreviewError, GradeError};
use crate::runner::RunnerError;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: u64 },
    #[error("node {node} does not belong to passage {passage}")]
    WrongParent { node: u64, passage: u64 },
    #[error("invalid {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl CatalogError {
    pub fn not_found(entity: &'static str, id: u64) -> Self {
        CatalogError::NotFound { entity, id }
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Grade(#[from] GradeError),
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error(transparent)]
    Preview(#[from] PreviewError),
    #[error("{kind} session {id} not found")]
    SessionNotFound { kind: &'static str, id: String },
    #[error("bad request: {0}")]
    BadRequest(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl ApiError {
    /// Stable machine-readable code for the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Catalog(CatalogError::NotFound { .. }) => "not_found",
            ApiError::Catalog(CatalogError::WrongParent { .. }) => "wrong_parent",
            ApiError::Catalog(CatalogError::Invalid { .. }) => "invalid_input",
            ApiError::Grade(GradeError::UnknownQuestionType(_)) => "unknown_question_type",
            ApiError::Grade(GradeError::AnswerMismatch { .. }) => "answer_mismatch",
            ApiError::Grade(_) => "invalid_input",
            ApiError::Runner(RunnerError::InvalidTransition { .. }) => "invalid_transition",
            ApiError::Runner(RunnerError::NoAnswer) | ApiError::Preview(PreviewError::NoAnswer) => "no_answer",
            ApiError::Runner(RunnerError::Grade(_)) | ApiError::Preview(PreviewError::Grade(_)) => "answer_mismatch",
            ApiError::SessionNotFound { .. } => "session_not_found",
            ApiError::BadRequest(_) => "bad_request",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Catalog(CatalogError::NotFound { .. }) | ApiError::SessionNotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Catalog(CatalogError::WrongParent { .. }) | ApiError::Runner(RunnerError::InvalidTransition { .. }) => {
                StatusCode::CONFLICT
            }
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        tracing::debug!(target: "quest_admin", error = %self, %status, "request rejected");
        (status, Json(ErrorBody { error: self.code(), message: self.to_string() })).into_response()
    }
}
