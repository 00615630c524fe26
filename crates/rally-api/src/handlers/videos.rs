//! Video API handlers.

use axum::extract::{Multipart, Path, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use rally_models::{NewVideo, VideoRecord};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Upload response.
#[derive(Serialize)]
pub struct UploadResponse {
    pub filename: String,
    pub file_size: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    pub message: String,
}

/// Upload a video file.
///
/// Accepts a single multipart field named `file`. The filename extension must
/// be one of the configured formats and the body must fit the size limit.
pub async fn upload_video(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut upload: Option<(String, Option<String>, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| ApiError::validation("Missing filename in upload"))?;
        let content_type = field.content_type().map(str::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::validation(format!("Failed to read upload: {e}")))?;

        upload = Some((filename, content_type, data.to_vec()));
        break;
    }

    let (filename, content_type, data) =
        upload.ok_or_else(|| ApiError::validation("Missing 'file' field in upload"))?;

    validate_extension(&filename, &state.config.supported_formats)?;

    if data.len() as u64 > state.config.max_file_size {
        return Err(ApiError::validation(format!(
            "File too large: {} bytes (max {})",
            data.len(),
            state.config.max_file_size
        )));
    }
    if data.is_empty() {
        return Err(ApiError::validation("Empty file upload"));
    }

    // The stored file backs the existing record and any analysis keyed to
    // this filename; it must not be overwritten by a re-upload.
    if state.store.get_video(&filename).await?.is_some() {
        return Err(ApiError::Conflict(format!("Already exists: {filename}")));
    }

    let path = state.storage.save(&filename, &data).await?;

    // Metadata extraction is best-effort; a video ffprobe cannot read is
    // still stored and can be retried later.
    let metadata = match rally_media::probe(&path).await {
        Ok(meta) => Some(meta),
        Err(e) => {
            warn!(filename = %filename, error = %e, "Failed to probe uploaded video");
            None
        }
    };

    let record = state
        .store
        .create_video(&NewVideo {
            filename: filename.clone(),
            file_path: path.to_string_lossy().into_owned(),
            file_size: data.len() as i64,
            content_type: content_type.clone(),
            metadata,
        })
        .await?;

    Ok(Json(UploadResponse {
        filename: record.filename,
        file_size: data.len() as u64,
        content_type,
        message: "Video uploaded successfully".to_string(),
    }))
}

fn validate_extension(filename: &str, supported: &[String]) -> ApiResult<()> {
    let lower = filename.to_lowercase();
    if supported.iter().any(|ext| lower.ends_with(ext.as_str())) {
        Ok(())
    } else {
        Err(ApiError::validation(format!(
            "Unsupported file format. Supported: {}",
            supported.join(", ")
        )))
    }
}

/// Video list response.
#[derive(Serialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoRecord>,
    pub count: usize,
}

/// List uploaded videos.
pub async fn list_videos(
    State(state): State<AppState>,
) -> ApiResult<Json<VideoListResponse>> {
    let videos = state.store.list_videos().await?;
    let count = videos.len();
    Ok(Json(VideoListResponse { videos, count }))
}

/// Get info for an uploaded video.
pub async fn get_video_info(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<VideoRecord>> {
    let record = state
        .store
        .get_video(&filename)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Video not found: {filename}")))?;

    Ok(Json(record))
}

/// Delete video response.
#[derive(Serialize)]
pub struct DeleteVideoResponse {
    pub success: bool,
    pub filename: String,
    pub message: String,
}

/// Delete an uploaded video file and its record.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<DeleteVideoResponse>> {
    let file_deleted = state.storage.delete(&filename).await?;
    let record_deleted = state.store.delete_video(&filename).await?;

    if !file_deleted && !record_deleted {
        return Err(ApiError::not_found(format!("Video not found: {filename}")));
    }

    Ok(Json(DeleteVideoResponse {
        success: true,
        filename,
        message: "Video deleted successfully".to_string(),
    }))
}
