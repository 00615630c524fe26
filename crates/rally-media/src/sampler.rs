//! Deterministic, evenly-spaced frame sampling.

use std::path::Path;

use tracing::{error, info, warn};

use crate::error::MediaResult;
use crate::probe::probe;
use crate::source::{FfmpegFrameSource, Frame, FrameSource};

/// Sampling interval for a source of `total_frames` frames under a
/// `max_frames` budget.
///
/// 1 when the whole source fits the budget, otherwise
/// `floor(total_frames / max_frames)`, never below 1.
pub fn sample_interval(total_frames: u64, max_frames: u32) -> u64 {
    debug_assert!(max_frames > 0);
    if total_frames <= u64::from(max_frames) {
        1
    } else {
        (total_frames / u64::from(max_frames)).max(1)
    }
}

/// Read frames from `source` and keep an evenly-spaced subsequence of at most
/// `max_frames`.
///
/// Skipped frames are read and discarded so the source cursor advances
/// monotonically. A read failure mid-stream truncates the sequence at the
/// last successfully read frame; no retry.
pub async fn sample_frames<S>(source: &mut S, max_frames: u32) -> Vec<Frame>
where
    S: FrameSource + ?Sized,
{
    let mut frames = Vec::new();
    if max_frames == 0 {
        return frames;
    }

    let interval = sample_interval(source.total_frames(), max_frames);

    loop {
        if frames.len() >= max_frames as usize {
            break;
        }
        match source.next_frame().await {
            Ok(Some(frame)) => {
                if u64::from(frame.index) % interval == 0 {
                    frames.push(frame);
                }
            }
            Ok(None) => break,
            Err(e) => {
                warn!(error = %e, kept = frames.len(), "frame read failed, truncating");
                break;
            }
        }
    }

    frames
}

/// Probe, open and sample a video file in one step.
///
/// A file that cannot be probed or opened yields an empty vec rather than an
/// error; the caller distinguishes that from a successful non-empty sample.
pub async fn extract_frames(path: &Path, max_frames: u32) -> Vec<Frame> {
    match try_extract_frames(path, max_frames).await {
        Ok(frames) => frames,
        Err(e) => {
            error!(?path, error = %e, "frame extraction failed");
            Vec::new()
        }
    }
}

async fn try_extract_frames(path: &Path, max_frames: u32) -> MediaResult<Vec<Frame>> {
    let metadata = probe(path).await?;
    info!(
        ?path,
        total_frames = metadata.frame_count,
        fps = metadata.fps,
        interval = sample_interval(metadata.frame_count, max_frames),
        "extracting frames"
    );

    let mut source = FfmpegFrameSource::open(path, &metadata).await?;
    let frames = sample_frames(&mut source, max_frames).await;
    info!(extracted = frames.len(), "frame extraction complete");
    Ok(frames)
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::error::MediaError;

    /// In-memory source producing 1x1 frames `0..total`, optionally failing
    /// after a given number of reads.
    struct SyntheticSource {
        total: u64,
        reported_total: u64,
        next: u32,
        fail_after: Option<u32>,
    }

    impl SyntheticSource {
        fn new(total: u64) -> Self {
            Self {
                total,
                reported_total: total,
                next: 0,
                fail_after: None,
            }
        }
    }

    #[async_trait]
    impl FrameSource for SyntheticSource {
        fn total_frames(&self) -> u64 {
            self.reported_total
        }

        async fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
            if let Some(limit) = self.fail_after {
                if self.next >= limit {
                    return Err(MediaError::InvalidVideo("synthetic failure".to_string()));
                }
            }
            if u64::from(self.next) >= self.total {
                return Ok(None);
            }
            let frame = Frame {
                index: self.next,
                width: 1,
                height: 1,
                data: vec![0, 0, 0],
            };
            self.next += 1;
            Ok(Some(frame))
        }
    }

    fn indices(frames: &[Frame]) -> Vec<u32> {
        frames.iter().map(|f| f.index).collect()
    }

    #[test]
    fn test_sample_interval() {
        assert_eq!(sample_interval(50, 100), 1);
        assert_eq!(sample_interval(100, 100), 1);
        assert_eq!(sample_interval(300, 100), 3);
        assert_eq!(sample_interval(101, 100), 1);
        assert_eq!(sample_interval(250, 100), 2);
        assert_eq!(sample_interval(0, 100), 1);
    }

    #[tokio::test]
    async fn test_short_source_emits_every_frame() {
        let mut source = SyntheticSource::new(50);
        let frames = sample_frames(&mut source, 100).await;
        assert_eq!(frames.len(), 50);
        assert_eq!(indices(&frames), (0..50).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_long_source_is_evenly_sampled() {
        let mut source = SyntheticSource::new(300);
        let frames = sample_frames(&mut source, 100).await;
        assert_eq!(frames.len(), 100);
        assert_eq!(
            indices(&frames),
            (0..100).map(|i| i * 3).collect::<Vec<_>>()
        );
        assert_eq!(frames.last().unwrap().index, 297);
    }

    #[tokio::test]
    async fn test_output_never_exceeds_budget() {
        let mut source = SyntheticSource::new(1000);
        let frames = sample_frames(&mut source, 7).await;
        assert!(frames.len() <= 7);
        let interval = sample_interval(1000, 7);
        for frame in &frames {
            assert_eq!(u64::from(frame.index) % interval, 0);
        }
    }

    #[tokio::test]
    async fn test_empty_source_yields_empty() {
        let mut source = SyntheticSource::new(0);
        let frames = sample_frames(&mut source, 100).await;
        assert!(frames.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_truncates() {
        let mut source = SyntheticSource::new(300);
        source.fail_after = Some(10);
        let frames = sample_frames(&mut source, 100).await;
        // Interval 3: frames 0, 3, 6, 9 were read before the failure.
        assert_eq!(indices(&frames), vec![0, 3, 6, 9]);
    }

    #[tokio::test]
    async fn test_source_underreporting_total_still_stops_at_budget() {
        // Source claims 10 frames but yields 40; interval stays 1 and the
        // budget caps the output.
        let mut source = SyntheticSource::new(40);
        source.reported_total = 10;
        let frames = sample_frames(&mut source, 20).await;
        assert_eq!(frames.len(), 20);
        assert_eq!(frames.last().unwrap().index, 19);
    }
}
