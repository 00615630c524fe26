//! Detection models.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box in source pixel coordinates.
///
/// Invariant: `x1 <= x2` and `y1 <= y2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Box width in pixels.
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    /// Box height in pixels.
    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }
}

/// One candidate object instance reported by the detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Detection {
    /// Bounding box in source pixel coordinates
    pub bbox: BoundingBox,

    /// Detector confidence in [0, 1], passed through verbatim
    pub confidence: f32,

    /// Model class identifier (COCO class 32 is "sports ball")
    pub class_id: u32,

    /// Zero-based position of the owning frame in the source sequence
    pub frame_index: u32,
}

/// All detections for a single sampled frame.
///
/// Ordering within `detections` is detector-output order and carries no
/// spatial meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FrameDetections {
    /// Original position of the frame in the source sequence
    pub frame_index: u32,

    /// Zero or more detections for this frame
    pub detections: Vec<Detection>,
}

impl FrameDetections {
    /// A frame with no detections.
    pub fn empty(frame_index: u32) -> Self {
        Self {
            frame_index,
            detections: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }
}
