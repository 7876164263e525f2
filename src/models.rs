use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use uuid::Uuid;

/// A stored note
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Note {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub title: String,
    pub content: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// A note that has not been persisted yet; the store assigns its id
#[derive(Debug, Clone, PartialEq)]
pub struct NewNote {
    pub title: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl NewNote {
    pub fn with_id(self, id: Uuid) -> Note {
        Note {
            id,
            title: self.title,
            content: self.content,
            created_at: self.created_at,
        }
    }
}

/// Request body for POST /notes
///
/// Fields stay untyped so that `false`, `0` and friends reach the handler's
/// truthiness check instead of failing deserialization.
#[derive(Debug, Default, Deserialize, utoipa::ToSchema)]
pub struct CreateNoteRequest {
    #[schema(value_type = Option<String>)]
    pub title: Option<JsonValue>,
    #[schema(value_type = Option<String>)]
    pub content: Option<JsonValue>,
}

/// Response type for successful POST /notes
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateNoteResponse {
    pub message: String,
    pub note: Note,
}

/// Response type for successful DELETE /notes/{id}
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct DeleteNoteResponse {
    pub message: String,
    #[serde(rename = "deletedId")]
    pub deleted_id: Uuid,
}

/// Response type for GET /
#[derive(Serialize, Deserialize, utoipa::ToSchema)]
pub struct ServiceInfo {
    pub message: String,
    pub endpoints: BTreeMap<String, String>,
}
