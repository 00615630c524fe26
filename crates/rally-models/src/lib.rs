//! Shared data models for the RallyVision backend.
//!
//! This crate provides Serde-serializable types for:
//! - Per-frame ball detections and bounding boxes
//! - Analysis summaries and persisted analysis records
//! - Video records and probed video metadata

pub mod analysis;
pub mod detection;
pub mod video;

// Re-export common types
pub use analysis::{AnalysisKind, AnalysisRecord, AnalysisSummary, NewAnalysis};
pub use detection::{BoundingBox, Detection, FrameDetections};
pub use video::{NewVideo, VideoMetadata, VideoRecord, VideoStatus};
