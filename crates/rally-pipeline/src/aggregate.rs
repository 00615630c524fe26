//! Aggregation of per-frame detections into summary statistics.

use rally_models::{AnalysisSummary, FrameDetections};

/// Reduce a sequence of per-frame detections to summary statistics.
///
/// Pure and total: the empty sequence yields the all-zero summary, and the
/// ratios are plain floating-point divisions (no rounding, no percentage
/// scaling).
pub fn summarize(frames: &[FrameDetections]) -> AnalysisSummary {
    let total_frames = frames.len() as u64;
    let frames_with_balls = frames.iter().filter(|f| !f.is_empty()).count() as u64;
    let total_ball_detections = frames.iter().map(|f| f.len() as u64).sum::<u64>();

    let (average_detections_per_frame, detection_rate) = if total_frames > 0 {
        (
            total_ball_detections as f64 / total_frames as f64,
            frames_with_balls as f64 / total_frames as f64,
        )
    } else {
        (0.0, 0.0)
    };

    AnalysisSummary {
        total_frames,
        frames_with_balls,
        total_ball_detections,
        average_detections_per_frame,
        detection_rate,
    }
}

#[cfg(test)]
mod tests {
    use rally_models::{BoundingBox, Detection};

    use super::*;

    fn detection(frame_index: u32) -> Detection {
        Detection {
            bbox: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            confidence: 0.9,
            class_id: 32,
            frame_index,
        }
    }

    fn frame(index: u32, count: usize) -> FrameDetections {
        FrameDetections {
            frame_index: index,
            detections: (0..count).map(|_| detection(index)).collect(),
        }
    }

    #[test]
    fn test_empty_input_is_all_zero() {
        assert_eq!(summarize(&[]), AnalysisSummary::default());
    }

    #[test]
    fn test_detections_on_frames_two_and_five() {
        // 10 sampled frames; one detection on frame 2, two on frame 5.
        let mut frames: Vec<FrameDetections> =
            (0..10).map(|i| FrameDetections::empty(i)).collect();
        frames[2] = frame(2, 1);
        frames[5] = frame(5, 2);

        let summary = summarize(&frames);
        assert_eq!(summary.total_frames, 10);
        assert_eq!(summary.frames_with_balls, 2);
        assert_eq!(summary.total_ball_detections, 3);
        assert_eq!(summary.average_detections_per_frame, 0.3);
        assert_eq!(summary.detection_rate, 0.2);
    }

    #[test]
    fn test_all_frames_empty() {
        let frames: Vec<FrameDetections> = (0..5).map(FrameDetections::empty).collect();
        let summary = summarize(&frames);
        assert_eq!(summary.total_frames, 5);
        assert_eq!(summary.frames_with_balls, 0);
        assert_eq!(summary.total_ball_detections, 0);
        assert_eq!(summary.average_detections_per_frame, 0.0);
        assert_eq!(summary.detection_rate, 0.0);
    }

    #[test]
    fn test_ratios_stay_in_range() {
        for counts in [vec![0, 0, 0], vec![1, 2, 3], vec![10, 0, 10]] {
            let frames: Vec<FrameDetections> = counts
                .iter()
                .enumerate()
                .map(|(i, &c)| frame(i as u32, c))
                .collect();
            let summary = summarize(&frames);
            assert!(summary.average_detections_per_frame >= 0.0);
            assert!((0.0..=1.0).contains(&summary.detection_rate));
        }
    }
}
