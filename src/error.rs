use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::store::StoreError;

/// Error response type
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Response type for health check endpoint
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

/// Response type for unhealthy status
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct UnhealthyResponse {
    pub status: String,
    pub error: String,
}

/// The store-backed operation a handler was performing when it failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ListNotes,
    GetNote,
    CreateNote,
    DeleteNote,
}

impl Operation {
    /// Message returned to the caller; never includes the underlying cause
    pub fn public_message(self) -> &'static str {
        match self {
            Operation::ListNotes => "Failed to fetch notes",
            Operation::GetNote => "Failed to fetch note",
            Operation::CreateNote => "Failed to create a note",
            Operation::DeleteNote => "Unable to delete note",
        }
    }
}

/// Custom error type for API endpoints
///
/// Every handler returns this type, so each failure maps to exactly one
/// status code and a JSON `{"error": ...}` body. Store failures are logged
/// with their classification and full cause chain; the response only carries
/// the fixed per-operation message.
#[derive(Debug)]
pub enum ApiError {
    /// `title` missing, null or empty
    TitleRequired,
    /// Request body was not a JSON object of the expected shape
    InvalidBody(String),
    /// No note matches the requested id
    NoteNotFound,
    /// The store failed while performing `operation`
    Store {
        operation: Operation,
        source: StoreError,
    },
}

impl ApiError {
    pub fn store(operation: Operation) -> impl FnOnce(StoreError) -> ApiError {
        move |source| ApiError::Store { operation, source }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ApiError::TitleRequired => {
                (StatusCode::BAD_REQUEST, "Title is required".to_string())
            }
            ApiError::InvalidBody(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NoteNotFound => (StatusCode::NOT_FOUND, "Note not found".to_string()),
            ApiError::Store { operation, source } => {
                tracing::error!(
                    operation = ?operation,
                    kind = source.kind(),
                    "{}: {}",
                    operation.public_message(),
                    source
                );
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    operation.public_message().to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message,
        });

        (status, body).into_response()
    }
}
