use crate::error::{ApiError, ErrorResponse, Operation};
use crate::models::{CreateNoteRequest, CreateNoteResponse, NewNote};
use crate::routes;
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde_json::Value as JsonValue;

/// POST /notes handler - Create a note
///
/// `title` must be present and truthy; `content` defaults to an empty
/// string. The store assigns the id and the server clock sets `createdAt`.
/// An empty body counts as `{}`; only syntactically broken JSON is rejected
/// before the title check.
#[utoipa::path(
    post,
    path = routes::NOTES,
    request_body = CreateNoteRequest,
    responses(
        (status = 201, description = "Note created", body = CreateNoteResponse),
        (status = 400, description = "Title missing or body is not JSON", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    ),
    tag = "notes"
)]
pub async fn create_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<CreateNoteResponse>), ApiError> {
    let request = parse_request(&body)?;

    let title = truthy_text(request.title).ok_or(ApiError::TitleRequired)?;

    let new_note = NewNote {
        title,
        content: truthy_text(request.content).unwrap_or_default(),
        created_at: Utc::now(),
    };

    let note = state
        .notes
        .insert(new_note)
        .await
        .map_err(ApiError::store(Operation::CreateNote))?;

    tracing::info!("Created note with id: {}", note.id);
    Ok((
        StatusCode::CREATED,
        Json(CreateNoteResponse {
            message: "Note created".to_string(),
            note,
        }),
    ))
}

fn parse_request(body: &[u8]) -> Result<CreateNoteRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(CreateNoteRequest::default());
    }

    let value: JsonValue = serde_json::from_slice(body)
        .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON body: {}", e)))?;

    // Arrays and scalars carry no fields, so the title check rejects them
    match value {
        JsonValue::Object(_) => serde_json::from_value(value)
            .map_err(|e| ApiError::InvalidBody(format!("Invalid JSON body: {}", e))),
        _ => Ok(CreateNoteRequest::default()),
    }
}

/// Text of a JSON field under JavaScript truthiness: missing, `null`,
/// `false`, `0` and `""` yield `None`; other non-strings keep their JSON text.
fn truthy_text(value: Option<JsonValue>) -> Option<String> {
    match value? {
        JsonValue::Null | JsonValue::Bool(false) => None,
        JsonValue::Number(n) if n.as_f64() == Some(0.0) => None,
        JsonValue::String(s) if s.is_empty() => None,
        JsonValue::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}
