//! Analysis models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::detection::FrameDetections;

/// Kind of analysis performed over a video.
///
/// Different kinds may run over the same video independently; the store keys
/// records by `(video_filename, analysis_type)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisKind {
    BallDetection,
    PoseEstimation,
}

impl AnalysisKind {
    /// String form used as the `analysis_type` database column.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnalysisKind::BallDetection => "ball_detection",
            AnalysisKind::PoseEstimation => "pose_estimation",
        }
    }
}

impl Default for AnalysisKind {
    fn default() -> Self {
        AnalysisKind::BallDetection
    }
}

impl fmt::Display for AnalysisKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized analysis kind string.
#[derive(Debug, thiserror::Error)]
#[error("unknown analysis kind: {0}")]
pub struct UnknownAnalysisKind(pub String);

impl FromStr for AnalysisKind {
    type Err = UnknownAnalysisKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ball_detection" => Ok(AnalysisKind::BallDetection),
            "pose_estimation" => Ok(AnalysisKind::PoseEstimation),
            other => Err(UnknownAnalysisKind(other.to_string())),
        }
    }
}

/// Aggregate statistics derived from a sequence of per-frame detections.
///
/// Always a pure function of the detection sequence; all fields are zero for
/// an empty sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisSummary {
    /// Number of sampled frames the detector ran over
    pub total_frames: u64,

    /// Frames with at least one detection
    pub frames_with_balls: u64,

    /// Detections across all frames
    pub total_ball_detections: u64,

    /// `total_ball_detections / total_frames`, 0 for an empty input
    pub average_detections_per_frame: f64,

    /// Fraction of frames with at least one detection, in [0, 1]
    pub detection_rate: f64,
}

/// A persisted analysis row.
///
/// Created exactly once per `(video_filename, analysis_type)` and never
/// mutated afterwards; deleted only by explicit request, which permits a
/// future re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisRecord {
    pub id: i64,
    pub video_filename: String,
    pub analysis_type: AnalysisKind,

    pub total_frames: i64,
    pub frames_with_balls: i64,
    pub total_ball_detections: i64,
    pub average_detections_per_frame: f64,
    pub detection_rate: f64,

    /// Raw per-frame detections, serialized as JSON
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ball_detections: Option<String>,

    /// Wall-clock processing time in seconds
    pub processing_time: f64,

    /// Model identity, absent when no detector was available
    pub model_used: Option<String>,

    /// Confidence threshold the detector filtered at
    pub confidence_threshold: f64,

    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for inserting a new analysis row.
#[derive(Debug, Clone)]
pub struct NewAnalysis {
    pub video_filename: String,
    pub analysis_type: AnalysisKind,
    pub summary: AnalysisSummary,

    /// Raw per-frame detections; serialized to JSON by the store
    pub ball_detections: Vec<FrameDetections>,

    pub processing_time: f64,
    pub model_used: Option<String>,
    pub confidence_threshold: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_string_roundtrip() {
        for kind in [AnalysisKind::BallDetection, AnalysisKind::PoseEstimation] {
            assert_eq!(kind.as_str().parse::<AnalysisKind>().unwrap(), kind);
        }
        assert!("free_throws".parse::<AnalysisKind>().is_err());
    }

    #[test]
    fn test_kind_serde_snake_case() {
        let json = serde_json::to_string(&AnalysisKind::BallDetection).unwrap();
        assert_eq!(json, "\"ball_detection\"");
    }

    #[test]
    fn test_summary_default_is_all_zero() {
        let s = AnalysisSummary::default();
        assert_eq!(s.total_frames, 0);
        assert_eq!(s.frames_with_balls, 0);
        assert_eq!(s.total_ball_detections, 0);
        assert_eq!(s.average_detections_per_frame, 0.0);
        assert_eq!(s.detection_rate, 0.0);
    }
}
