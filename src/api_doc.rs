use utoipa::OpenApi;

use crate::error::{ErrorResponse, HealthResponse, UnhealthyResponse};
use crate::handlers;
use crate::models::{CreateNoteRequest, CreateNoteResponse, DeleteNoteResponse, Note, ServiceInfo};

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "notes-api",
        version = "1.0.0",
        description = "Create, read and delete notes stored in Google Cloud Spanner"
    ),
    paths(
        handlers::info::info_handler,
        handlers::health::health_handler,
        handlers::list::list_handler,
        handlers::get::get_handler,
        handlers::create::create_handler,
        handlers::delete::delete_handler
    ),
    components(
        schemas(
            Note,
            CreateNoteRequest,
            CreateNoteResponse,
            DeleteNoteResponse,
            ServiceInfo,
            ErrorResponse,
            HealthResponse,
            UnhealthyResponse
        )
    ),
    tags(
        (name = "info", description = "Service description"),
        (name = "health", description = "Health check operations"),
        (name = "notes", description = "Note operations")
    )
)]
pub struct ApiDoc;
