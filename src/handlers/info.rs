use crate::models::ServiceInfo;
use crate::routes;
use axum::Json;
use std::collections::BTreeMap;

const ENDPOINTS: [(&str, &str); 5] = [
    ("GET /", "Service info"),
    ("GET /notes", "Get all notes"),
    ("GET /notes/:id", "Get single note"),
    ("POST /notes", "Create note"),
    ("DELETE /notes/:id", "Delete note"),
];

/// GET / handler - Describe the available endpoints
#[utoipa::path(
    get,
    path = routes::ROOT,
    responses(
        (status = 200, description = "Endpoint catalog", body = ServiceInfo)
    ),
    tag = "info"
)]
pub async fn info_handler() -> Json<ServiceInfo> {
    let endpoints: BTreeMap<String, String> = ENDPOINTS
        .iter()
        .map(|(route, description)| (route.to_string(), description.to_string()))
        .collect();

    Json(ServiceInfo {
        message: "Notes API".to_string(),
        endpoints,
    })
}
