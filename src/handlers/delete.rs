use crate::error::{ApiError, ErrorResponse, Operation};
use crate::handlers::parse_note_id;
use crate::models::DeleteNoteResponse;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, Json};

/// DELETE /notes/{id} handler - Remove one note
#[utoipa::path(
    delete,
    path = routes::NOTE_ITEM,
    params(
        ("id" = String, Path, description = "Note id (UUID)")
    ),
    responses(
        (status = 200, description = "Note deleted", body = DeleteNoteResponse),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<DeleteNoteResponse>, ApiError> {
    let id = parse_note_id(&id_str).ok_or(ApiError::NoteNotFound)?;

    let removed = state
        .notes
        .delete(id)
        .await
        .map_err(ApiError::store(Operation::DeleteNote))?;

    if !removed {
        tracing::info!("Nothing to delete for id: {}", id);
        return Err(ApiError::NoteNotFound);
    }

    tracing::info!("Deleted note with id: {}", id);
    Ok(Json(DeleteNoteResponse {
        message: "Note deleted successfully".to_string(),
        deleted_id: id,
    }))
}
