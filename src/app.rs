use anyhow::Context;
use axum::{routing::get, Router};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::api_doc::ApiDoc;
use crate::handlers;
use crate::routes;
use crate::state::AppState;
use crate::store::NoteStore;

/// Build the application router over the given state
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(routes::ROOT, get(handlers::info_handler))
        .route(routes::HEALTH, get(handlers::health_handler))
        .route(
            routes::NOTES,
            get(handlers::list_handler).post(handlers::create_handler),
        )
        .route(
            routes::NOTE_ITEM,
            get(handlers::get_handler).delete(handlers::delete_handler),
        )
        .merge(SwaggerUi::new(routes::SWAGGER_UI).url(routes::OPENAPI_JSON, ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listener` until `shutdown` resolves.
///
/// The store is closed whether the server stops cleanly or fails.
pub async fn serve(
    listener: TcpListener,
    notes: Arc<dyn NoteStore>,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let served = axum::serve(listener, router(AppState::new(notes.clone())))
        .with_graceful_shutdown(shutdown)
        .await;

    notes.close().await;
    served.context("Server error")
}
