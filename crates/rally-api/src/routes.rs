//! API routes.

use axum::extract::DefaultBodyLimit;
use axum::middleware;
use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::analysis::{delete_analysis, get_analysis, list_analyses, start_analysis};
use crate::handlers::health::{health, ready};
use crate::handlers::videos::{delete_video, get_video_info, list_videos, upload_video};
use crate::middleware::{cors_layer, request_logging};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Analysis
        .route("/analysis", get(list_analyses))
        .route("/analysis/:video_filename", post(start_analysis))
        .route("/analysis/:video_filename", get(get_analysis))
        .route("/analysis/:video_filename", delete(delete_analysis))
        // Videos
        .route("/videos/upload", post(upload_video))
        .route("/videos", get(list_videos))
        .route("/videos/:filename", get(get_video_info))
        .route("/videos/:filename", delete(delete_video));

    let health_routes = Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    let max_file_size = state.config.max_file_size as usize;

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(DefaultBodyLimit::max(max_file_size))
        .layer(middleware::from_fn(request_logging))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
