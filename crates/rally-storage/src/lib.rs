//! Local-disk video file storage.
//!
//! This crate provides:
//! - Saving uploaded video files under a configured directory
//! - Path resolution and existence checks by filename
//! - File deletion

pub mod error;
pub mod local;

pub use error::{StorageError, StorageResult};
pub use local::VideoStorage;
