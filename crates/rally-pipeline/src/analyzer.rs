//! Pipeline orchestrator.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{info, warn};

use rally_db::AnalysisStore;
use rally_detect::Detector;
use rally_media::Frame;
use rally_models::{AnalysisRecord, FrameDetections, NewAnalysis};

use crate::aggregate::summarize;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};

/// Source of sampled frames for one video file.
///
/// Open/probe failures and empty sources yield an empty vec; the orchestrator
/// turns that into the terminal "no frames extracted" failure.
#[async_trait]
pub trait FrameProvider: Send + Sync {
    async fn extract(&self, path: &Path, max_frames: u32) -> Vec<Frame>;
}

/// Default provider: probe + decode through ffmpeg.
#[derive(Debug, Clone, Copy, Default)]
pub struct FfmpegFrames;

#[async_trait]
impl FrameProvider for FfmpegFrames {
    async fn extract(&self, path: &Path, max_frames: u32) -> Vec<Frame> {
        rally_media::extract_frames(path, max_frames).await
    }
}

/// Result of one `analyze` call.
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub record: AnalysisRecord,

    /// True when the record came from the store rather than a fresh run
    pub cached: bool,
}

/// Composes sampler, detector, aggregator and store into one idempotent
/// operation.
///
/// Constructed once at startup and shared by reference; invocations hold no
/// state besides their own frame buffer, so independent videos may be
/// analyzed concurrently.
pub struct Analyzer {
    detector: Arc<dyn Detector>,
    store: Arc<dyn AnalysisStore>,
    frames: Arc<dyn FrameProvider>,
    config: PipelineConfig,
}

impl Analyzer {
    pub fn new(
        detector: Arc<dyn Detector>,
        store: Arc<dyn AnalysisStore>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            detector,
            store,
            frames: Arc::new(FfmpegFrames),
            config,
        }
    }

    /// Replace the frame provider (tests).
    pub fn with_frame_provider(mut self, frames: Arc<dyn FrameProvider>) -> Self {
        self.frames = frames;
        self
    }

    /// Analyze one video, or return the already-stored result.
    ///
    /// Runs sequentially end to end; a detector failure for any frame aborts
    /// the whole invocation and nothing is persisted.
    pub async fn analyze(
        &self,
        video_filename: &str,
        video_path: &Path,
    ) -> PipelineResult<AnalysisOutcome> {
        let kind = self.config.analysis_kind;

        // Idempotent short-circuit: no re-analysis, no timing recorded.
        let existing = self
            .store
            .get(video_filename, kind)
            .await
            .map_err(PipelineError::Storage)?;
        if let Some(record) = existing {
            info!(video = video_filename, %kind, "analysis already exists");
            return Ok(AnalysisOutcome {
                record,
                cached: true,
            });
        }

        info!(video = video_filename, %kind, "starting analysis");
        let started = Instant::now();

        let frames = self.frames.extract(video_path, self.config.max_frames).await;
        if frames.is_empty() {
            return Err(PipelineError::NoFramesExtracted);
        }

        let mut detections: Vec<FrameDetections> = Vec::with_capacity(frames.len());
        for frame in &frames {
            let frame_detections = self
                .detector
                .detect(frame)
                .await
                .map_err(|e| PipelineError::Detection(e.to_string()))?;
            detections.push(FrameDetections {
                frame_index: frame.index,
                detections: frame_detections,
            });
        }
        drop(frames);

        let summary = summarize(&detections);
        let processing_time = started.elapsed().as_secs_f64();

        let input = NewAnalysis {
            video_filename: video_filename.to_string(),
            analysis_type: kind,
            summary,
            ball_detections: detections,
            processing_time,
            model_used: self.detector.model_id().map(str::to_string),
            confidence_threshold: self.config.confidence_threshold,
        };

        match self.store.put(input).await {
            Ok(record) => {
                info!(
                    video = video_filename,
                    total_frames = summary.total_frames,
                    total_ball_detections = summary.total_ball_detections,
                    processing_time,
                    "analysis complete"
                );
                Ok(AnalysisOutcome {
                    record,
                    cached: false,
                })
            }
            // A concurrent invocation won the uniqueness race; its record is
            // the analysis for this video now.
            Err(e) if e.is_conflict() => {
                warn!(video = video_filename, "lost persistence race, returning winner");
                let winner = self
                    .store
                    .get(video_filename, kind)
                    .await
                    .map_err(PipelineError::Storage)?
                    .ok_or(PipelineError::Storage(e))?;
                Ok(AnalysisOutcome {
                    record: winner,
                    cached: true,
                })
            }
            Err(e) => Err(PipelineError::Storage(e)),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
