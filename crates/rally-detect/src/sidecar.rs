//! HTTP client for the YOLO inference sidecar.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use rally_media::Frame;
use rally_models::{BoundingBox, Detection};

use crate::detector::{Detector, NullDetector};
use crate::error::{DetectError, DetectResult};

/// COCO class id for "sports ball".
pub const SPORTS_BALL_CLASS_ID: u32 = 32;

/// Default minimum confidence for surfaced detections.
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.5;

/// Configuration for the sidecar detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Base URL of the inference sidecar
    pub base_url: String,
    /// Request timeout per frame
    pub timeout: Duration,
    /// Class id detections are filtered to
    pub target_class: u32,
    /// Minimum confidence for surfaced detections
    pub confidence_threshold: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8001".to_string(),
            timeout: Duration::from_secs(30),
            target_class: SPORTS_BALL_CLASS_ID,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
        }
    }
}

impl DetectorConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("DETECTOR_URL").unwrap_or(defaults.base_url),
            timeout: Duration::from_secs(
                std::env::var("DETECTOR_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            target_class: std::env::var("DETECTOR_TARGET_CLASS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.target_class),
            confidence_threshold: std::env::var("CONFIDENCE_THRESHOLD")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.confidence_threshold),
        }
    }
}

/// One raw detection as reported by the sidecar, before filtering.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireDetection {
    /// [x1, y1, x2, y2] in source pixel coordinates
    pub bbox: [f32; 4],
    pub confidence: f32,
    pub class_id: u32,
}

#[derive(Debug, Deserialize)]
struct DetectResponse {
    detections: Vec<WireDetection>,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    model: Option<String>,
}

/// Detector backed by a YOLO inference sidecar over HTTP.
pub struct SidecarDetector {
    http: Client,
    config: DetectorConfig,
    model_id: String,
}

impl SidecarDetector {
    /// Probe the sidecar and construct a detector bound to its model.
    ///
    /// Fails with [`DetectError::Unavailable`] when the sidecar is down or
    /// unhealthy.
    pub async fn connect(config: DetectorConfig) -> DetectResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(DetectError::Network)?;

        let url = format!("{}/health", config.base_url);
        let response = http
            .get(&url)
            .send()
            .await
            .map_err(|e| DetectError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(DetectError::Unavailable(format!(
                "health check returned {}",
                response.status()
            )));
        }

        let health: HealthResponse = response
            .json()
            .await
            .map_err(|e| DetectError::InvalidResponse(e.to_string()))?;

        if health.status != "healthy" && health.status != "ok" {
            return Err(DetectError::Unavailable(format!(
                "sidecar status: {}",
                health.status
            )));
        }

        let model_id = health.model.unwrap_or_else(|| "yolov8n".to_string());

        Ok(Self {
            http,
            config,
            model_id,
        })
    }

    /// Filter raw sidecar output to the target class at or above the
    /// confidence threshold, tagging each kept detection with its frame.
    fn filter(&self, raw: Vec<WireDetection>, frame_index: u32) -> Vec<Detection> {
        raw.into_iter()
            .filter(|d| {
                d.class_id == self.config.target_class
                    && d.confidence >= self.config.confidence_threshold
            })
            .map(|d| Detection {
                bbox: BoundingBox::new(d.bbox[0], d.bbox[1], d.bbox[2], d.bbox[3]),
                confidence: d.confidence,
                class_id: d.class_id,
                frame_index,
            })
            .collect()
    }
}

#[async_trait]
impl Detector for SidecarDetector {
    fn model_id(&self) -> Option<&str> {
        Some(&self.model_id)
    }

    async fn detect(&self, frame: &Frame) -> DetectResult<Vec<Detection>> {
        let url = format!("{}/v1/detect", self.config.base_url);

        let response = self
            .http
            .post(&url)
            .query(&[
                ("width", frame.width.to_string()),
                ("height", frame.height.to_string()),
                ("frame_index", frame.index.to_string()),
            ])
            .header("content-type", "application/octet-stream")
            .body(frame.data.clone())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DetectError::RequestFailed(format!(
                "sidecar returned {status}: {body}"
            )));
        }

        let parsed: DetectResponse = response
            .json()
            .await
            .map_err(|e| DetectError::InvalidResponse(e.to_string()))?;

        let detections = self.filter(parsed.detections, frame.index);
        debug!(
            frame_index = frame.index,
            detections = detections.len(),
            "frame detection complete"
        );
        Ok(detections)
    }
}

/// Select the process-wide detector backend.
///
/// Probes the sidecar once; when it cannot be reached, ball detection is
/// disabled for the lifetime of the process and analyses record a null model
/// identity.
pub async fn init_detector(config: DetectorConfig) -> Arc<dyn Detector> {
    match SidecarDetector::connect(config).await {
        Ok(detector) => {
            info!(model = detector.model_id, "detector initialized");
            Arc::new(detector)
        }
        Err(e) => {
            warn!(error = %e, "detector unavailable, ball detection disabled");
            Arc::new(NullDetector)
        }
    }
}
