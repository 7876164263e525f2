use crate::error::{ApiError, ErrorResponse, Operation};
use crate::handlers::parse_note_id;
use crate::models::Note;
use crate::routes;
use crate::state::AppState;
use axum::{extract::Path, extract::State, Json};

/// GET /notes/{id} handler - Retrieve one note
#[utoipa::path(
    get,
    path = routes::NOTE_ITEM,
    params(
        ("id" = String, Path, description = "Note id (UUID)")
    ),
    responses(
        (status = 200, description = "Note found", body = Note),
        (status = 404, description = "Note not found", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn get_handler(
    State(state): State<AppState>,
    Path(id_str): Path<String>,
) -> Result<Json<Note>, ApiError> {
    let id = parse_note_id(&id_str).ok_or(ApiError::NoteNotFound)?;

    match state
        .notes
        .find(id)
        .await
        .map_err(ApiError::store(Operation::GetNote))?
    {
        Some(note) => {
            tracing::info!("Retrieved note with id: {}", id);
            Ok(Json(note))
        }
        None => {
            tracing::info!("Note not found with id: {}", id);
            Err(ApiError::NoteNotFound)
        }
    }
}
