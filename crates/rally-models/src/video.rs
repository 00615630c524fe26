//! Video models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Processing status of an uploaded video.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum VideoStatus {
    Uploaded,
    Processing,
    Completed,
    Failed,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VideoStatus::Uploaded => "uploaded",
            VideoStatus::Processing => "processing",
            VideoStatus::Completed => "completed",
            VideoStatus::Failed => "failed",
        }
    }
}

impl Default for VideoStatus {
    fn default() -> Self {
        VideoStatus::Uploaded
    }
}

impl fmt::Display for VideoStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for an unrecognized video status string.
#[derive(Debug, thiserror::Error)]
#[error("unknown video status: {0}")]
pub struct UnknownVideoStatus(pub String);

impl FromStr for VideoStatus {
    type Err = UnknownVideoStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "uploaded" => Ok(VideoStatus::Uploaded),
            "processing" => Ok(VideoStatus::Processing),
            "completed" => Ok(VideoStatus::Completed),
            "failed" => Ok(VideoStatus::Failed),
            other => Err(UnknownVideoStatus(other.to_string())),
        }
    }
}

/// Container-level metadata probed from a video file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoMetadata {
    /// Duration in seconds
    pub duration: f64,

    /// Average frame rate
    pub fps: f64,

    pub width: u32,
    pub height: u32,

    /// Total frame count; estimated from duration and fps when the container
    /// does not report it
    pub frame_count: u64,
}

/// A persisted video row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VideoRecord {
    pub id: i64,
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: Option<String>,

    pub duration: Option<f64>,
    pub fps: Option<f64>,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub frame_count: Option<i64>,

    pub status: VideoStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Input for inserting a new video row.
#[derive(Debug, Clone)]
pub struct NewVideo {
    pub filename: String,
    pub file_path: String,
    pub file_size: i64,
    pub content_type: Option<String>,
    pub metadata: Option<VideoMetadata>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_string_roundtrip() {
        for status in [
            VideoStatus::Uploaded,
            VideoStatus::Processing,
            VideoStatus::Completed,
            VideoStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<VideoStatus>().unwrap(), status);
        }
    }
}
