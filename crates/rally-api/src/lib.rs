//! Axum HTTP API server.
//!
//! This crate provides:
//! - Video upload and CRUD endpoints
//! - Analysis trigger/read/list/delete endpoints
//! - Request logging and CORS middleware
//! - Application state wiring (store, storage, detector, analyzer)

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
