//! SQLite persistence for the RallyVision backend.
//!
//! This crate provides:
//! - Pool construction and idempotent schema setup
//! - Video record CRUD
//! - The analysis store: at most one record per
//!   `(video_filename, analysis_type)`, enforced with a UNIQUE constraint so
//!   concurrent check-then-write sequences cannot produce duplicates

pub mod analysis;
pub mod error;
pub mod store;
pub mod video;

pub use analysis::AnalysisStore;
pub use error::{DbError, DbResult};
pub use store::SqliteStore;
