//! Pipeline configuration.

use rally_models::AnalysisKind;

/// Tuning knobs for one analyzer instance.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Frame budget per analysis
    pub max_frames: u32,

    /// Threshold recorded on stored analyses; the detector filters at the
    /// same value
    pub confidence_threshold: f64,

    /// Kind tag stored with each analysis
    pub analysis_kind: AnalysisKind,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_frames: 100,
            confidence_threshold: 0.5,
            analysis_kind: AnalysisKind::BallDetection,
        }
    }
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_frames: std::env::var("MAX_FRAMES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n| n > 0)
                .unwrap_or(defaults.max_frames),
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
            analysis_kind: defaults.analysis_kind,
        }
    }
}
