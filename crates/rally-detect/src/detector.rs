//! Detector capability trait.

use async_trait::async_trait;

use rally_media::Frame;
use rally_models::Detection;

use crate::error::DetectResult;

/// Object detection capability.
///
/// Implementations filter their raw output to the configured target class
/// and minimum confidence before returning, so callers only ever see
/// detections worth counting.
#[async_trait]
pub trait Detector: Send + Sync {
    /// Identity of the backing model, `None` when no detector is available.
    fn model_id(&self) -> Option<&str>;

    /// Run detection on one frame.
    async fn detect(&self, frame: &Frame) -> DetectResult<Vec<Detection>>;
}

/// The "unavailable" detector variant.
///
/// Every `detect` call succeeds with an empty result; analyses performed with
/// it record a null model identity.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDetector;

#[async_trait]
impl Detector for NullDetector {
    fn model_id(&self) -> Option<&str> {
        None
    }

    async fn detect(&self, _frame: &Frame) -> DetectResult<Vec<Detection>> {
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_detector_reports_nothing() {
        let detector = NullDetector;
        assert!(detector.model_id().is_none());

        let frame = Frame {
            index: 0,
            width: 2,
            height: 2,
            data: vec![0; 12],
        };
        let detections = detector.detect(&frame).await.unwrap();
        assert!(detections.is_empty());
    }
}
