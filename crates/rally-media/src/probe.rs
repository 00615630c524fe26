//! Video metadata probing via ffprobe.

use std::path::Path;

use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use rally_models::VideoMetadata;

use crate::error::{MediaError, MediaResult};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeStream {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
    nb_frames: Option<String>,
    duration: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    duration: Option<String>,
}

/// Probe container metadata for a video file.
pub async fn probe(path: &Path) -> MediaResult<VideoMetadata> {
    if !path.exists() {
        return Err(MediaError::FileNotFound(path.to_path_buf()));
    }

    let ffprobe = which::which("ffprobe").map_err(|_| MediaError::FfprobeNotFound)?;

    let output = Command::new(ffprobe)
        .arg("-v")
        .arg("error")
        .arg("-print_format")
        .arg("json")
        .arg("-show_format")
        .arg("-show_streams")
        .arg(path)
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).to_string();
        return Err(MediaError::ffprobe_failed(
            format!("exit status {}", output.status),
            Some(stderr),
        ));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let metadata = parse_probe_output(&stdout)?;
    debug!(?path, ?metadata, "probed video");
    Ok(metadata)
}

/// Parse ffprobe JSON output into `VideoMetadata`.
pub(crate) fn parse_probe_output(json: &str) -> MediaResult<VideoMetadata> {
    let parsed: ProbeOutput = serde_json::from_str(json)?;

    let stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| MediaError::InvalidVideo("no video stream".to_string()))?;

    let width = stream
        .width
        .ok_or_else(|| MediaError::InvalidVideo("missing width".to_string()))?;
    let height = stream
        .height
        .ok_or_else(|| MediaError::InvalidVideo("missing height".to_string()))?;

    let fps = stream
        .avg_frame_rate
        .as_deref()
        .and_then(parse_rational)
        .or_else(|| stream.r_frame_rate.as_deref().and_then(parse_rational))
        .unwrap_or(0.0);

    let duration = stream
        .duration
        .as_deref()
        .or_else(|| parsed.format.as_ref().and_then(|f| f.duration.as_deref()))
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    // Some containers do not report nb_frames; fall back to duration * fps.
    let frame_count = stream
        .nb_frames
        .as_deref()
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or_else(|| (duration * fps).round().max(0.0) as u64);

    Ok(VideoMetadata {
        duration,
        fps,
        width,
        height,
        frame_count,
    })
}

/// Parse an ffprobe rational like `30000/1001` (or a plain number) to f64.
fn parse_rational(s: &str) -> Option<f64> {
    match s.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().ok()?;
            let den: f64 = den.parse().ok()?;
            if den == 0.0 {
                None
            } else {
                Some(num / den)
            }
        }
        None => s.parse().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "streams": [
            {
                "codec_type": "audio",
                "avg_frame_rate": "0/0"
            },
            {
                "codec_type": "video",
                "width": 1920,
                "height": 1080,
                "avg_frame_rate": "30000/1001",
                "nb_frames": "300",
                "duration": "10.010000"
            }
        ],
        "format": { "duration": "10.031000" }
    }"#;

    #[test]
    fn test_parse_rational() {
        assert_eq!(parse_rational("30/1"), Some(30.0));
        assert_eq!(parse_rational("25"), Some(25.0));
        assert!((parse_rational("30000/1001").unwrap() - 29.97).abs() < 0.01);
        assert_eq!(parse_rational("0/0"), None);
        assert_eq!(parse_rational("n/a"), None);
    }

    #[test]
    fn test_parse_probe_output() {
        let meta = parse_probe_output(SAMPLE).unwrap();
        assert_eq!(meta.width, 1920);
        assert_eq!(meta.height, 1080);
        assert_eq!(meta.frame_count, 300);
        assert!((meta.fps - 29.97).abs() < 0.01);
        assert!((meta.duration - 10.01).abs() < 0.001);
    }

    #[test]
    fn test_parse_probe_output_estimates_missing_frame_count() {
        let json = r#"{
            "streams": [
                { "codec_type": "video", "width": 640, "height": 480, "avg_frame_rate": "30/1" }
            ],
            "format": { "duration": "10.0" }
        }"#;
        let meta = parse_probe_output(json).unwrap();
        assert_eq!(meta.frame_count, 300);
    }

    #[test]
    fn test_parse_probe_output_no_video_stream() {
        let json = r#"{ "streams": [ { "codec_type": "audio" } ] }"#;
        assert!(matches!(
            parse_probe_output(json),
            Err(MediaError::InvalidVideo(_))
        ));
    }
}
