//! FFmpeg CLI wrapper for video ingestion.
//!
//! This crate provides:
//! - Container metadata probing via ffprobe
//! - A `FrameSource` abstraction over a decoded RGB24 frame stream
//! - Deterministic, evenly-spaced frame sampling

pub mod error;
pub mod probe;
pub mod sampler;
pub mod source;

pub use error::{MediaError, MediaResult};
pub use probe::probe;
pub use sampler::{extract_frames, sample_frames, sample_interval};
pub use source::{FfmpegFrameSource, Frame, FrameSource};
