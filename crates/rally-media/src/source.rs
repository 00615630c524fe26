//! Decoded frame stream over an ffmpeg child process.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::process::{Child, ChildStdout, Command};
use tracing::debug;

use rally_models::VideoMetadata;

use crate::error::{MediaError, MediaResult};

/// One decoded RGB24 raster plus its original position in the source
/// sequence.
///
/// Frames are transient: they live only within one pipeline invocation and
/// are discarded after detection.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Zero-based position in the source sequence (not contiguous after
    /// sampling)
    pub index: u32,
    pub width: u32,
    pub height: u32,
    /// Raw RGB24 pixel data, `width * height * 3` bytes
    pub data: Vec<u8>,
}

/// A sequential source of decoded frames.
#[async_trait]
pub trait FrameSource: Send {
    /// Total frame count reported by the container (0 when unknown).
    fn total_frames(&self) -> u64;

    /// Read the next frame, or `None` at end of stream.
    async fn next_frame(&mut self) -> MediaResult<Option<Frame>>;
}

/// Frame source backed by `ffmpeg -f rawvideo -pix_fmt rgb24` on stdout.
///
/// The child process is killed when the source is dropped, so decode
/// resources are released on every exit path.
pub struct FfmpegFrameSource {
    _child: Child,
    stdout: ChildStdout,
    width: u32,
    height: u32,
    total_frames: u64,
    next_index: u32,
}

impl FfmpegFrameSource {
    /// Spawn ffmpeg for the given file and begin streaming frames.
    pub async fn open(path: &Path, metadata: &VideoMetadata) -> MediaResult<Self> {
        if !path.exists() {
            return Err(MediaError::FileNotFound(path.to_path_buf()));
        }
        if metadata.width == 0 || metadata.height == 0 {
            return Err(MediaError::InvalidVideo(
                "zero spatial dimensions".to_string(),
            ));
        }

        let ffmpeg = which::which("ffmpeg").map_err(|_| MediaError::FfmpegNotFound)?;

        let mut child = Command::new(ffmpeg)
            .arg("-v")
            .arg("error")
            .arg("-i")
            .arg(path)
            .arg("-f")
            .arg("rawvideo")
            .arg("-pix_fmt")
            .arg("rgb24")
            .arg("pipe:1")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| MediaError::OpenFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let stdout = child.stdout.take().ok_or_else(|| MediaError::OpenFailed {
            path: path.to_path_buf(),
            message: "no stdout handle".to_string(),
        })?;

        debug!(?path, total_frames = metadata.frame_count, "opened frame source");

        Ok(Self {
            _child: child,
            stdout,
            width: metadata.width,
            height: metadata.height,
            total_frames: metadata.frame_count,
            next_index: 0,
        })
    }

    fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * 3
    }
}

#[async_trait]
impl FrameSource for FfmpegFrameSource {
    fn total_frames(&self) -> u64 {
        self.total_frames
    }

    async fn next_frame(&mut self) -> MediaResult<Option<Frame>> {
        let mut data = vec![0u8; self.frame_size()];
        match self.stdout.read_exact(&mut data).await {
            Ok(_) => {
                let frame = Frame {
                    index: self.next_index,
                    width: self.width,
                    height: self.height,
                    data,
                };
                self.next_index += 1;
                Ok(Some(frame))
            }
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(MediaError::Io(e)),
        }
    }
}
