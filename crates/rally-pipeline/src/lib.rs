//! Video analysis pipeline.
//!
//! This crate composes the frame sampler, detector adapter, aggregator and
//! analysis store into a single idempotent `analyze` operation:
//!
//! check existing -> sampling -> detecting -> aggregating -> persisting
//!
//! A stored result short-circuits the whole pipeline; a lost persistence race
//! resolves to the winning record instead of a duplicate or an error.

pub mod aggregate;
pub mod analyzer;
pub mod config;
pub mod error;

pub use aggregate::summarize;
pub use analyzer::{AnalysisOutcome, Analyzer, FfmpegFrames, FrameProvider};
pub use config::PipelineConfig;
pub use error::{PipelineError, PipelineResult};
