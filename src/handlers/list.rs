use crate::error::{ApiError, ErrorResponse, Operation};
use crate::models::Note;
use crate::routes;
use crate::state::AppState;
use axum::{extract::State, Json};

/// GET /notes handler - List every note
///
/// No filtering, sorting or pagination; notes come back in whatever order
/// the store yields them.
#[utoipa::path(
    get,
    path = routes::NOTES,
    responses(
        (status = 200, description = "All notes", body = Vec<Note>),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn list_handler(State(state): State<AppState>) -> Result<Json<Vec<Note>>, ApiError> {
    let notes = state
        .notes
        .list()
        .await
        .map_err(ApiError::store(Operation::ListNotes))?;

    tracing::info!("Listed {} notes", notes.len());
    Ok(Json(notes))
}
