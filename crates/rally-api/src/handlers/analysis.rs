//! Analysis API handlers.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use rally_db::AnalysisStore;
use rally_models::AnalysisRecord;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Single analysis response.
#[derive(Serialize)]
pub struct AnalysisResponse {
    pub id: i64,
    pub video_filename: String,
    pub analysis_type: String,
    pub total_frames: i64,
    pub frames_with_balls: i64,
    pub total_ball_detections: i64,
    pub average_detections_per_frame: f64,
    pub detection_rate: f64,
    pub processing_time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_used: Option<String>,
    pub confidence_threshold: f64,
    pub created_at: String,
}

impl From<&AnalysisRecord> for AnalysisResponse {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id,
            video_filename: record.video_filename.clone(),
            analysis_type: record.analysis_type.to_string(),
            total_frames: record.total_frames,
            frames_with_balls: record.frames_with_balls,
            total_ball_detections: record.total_ball_detections,
            average_detections_per_frame: record.average_detections_per_frame,
            detection_rate: record.detection_rate,
            processing_time: record.processing_time,
            model_used: record.model_used.clone(),
            confidence_threshold: record.confidence_threshold,
            created_at: record.created_at.to_rfc3339(),
        }
    }
}

/// Start analysis response.
#[derive(Serialize)]
pub struct StartAnalysisResponse {
    pub message: String,
    #[serde(flatten)]
    pub analysis: AnalysisResponse,
}

/// Run analysis for an uploaded video, returning the cached result when one
/// already exists.
pub async fn start_analysis(
    State(state): State<AppState>,
    Path(video_filename): Path<String>,
) -> ApiResult<Json<StartAnalysisResponse>> {
    if !state.storage.exists(&video_filename).await {
        return Err(ApiError::not_found(format!(
            "Video file not found: {video_filename}"
        )));
    }

    let video_path = state.storage.path_for(&video_filename)?;
    let outcome = state.analyzer.analyze(&video_filename, &video_path).await?;

    let message = if outcome.cached {
        "Analysis already exists"
    } else {
        "Analysis completed successfully"
    };

    Ok(Json(StartAnalysisResponse {
        message: message.to_string(),
        analysis: AnalysisResponse::from(&outcome.record),
    }))
}

/// Get a stored analysis.
pub async fn get_analysis(
    State(state): State<AppState>,
    Path(video_filename): Path<String>,
) -> ApiResult<Json<AnalysisResponse>> {
    let kind = state.analyzer.config().analysis_kind;
    let record = state
        .store
        .get(&video_filename, kind)
        .await
        .map_err(ApiError::from)?
        .ok_or_else(|| {
            ApiError::not_found(format!("Analysis not found: {video_filename}"))
        })?;

    Ok(Json(AnalysisResponse::from(&record)))
}

/// Analysis list response.
#[derive(Serialize)]
pub struct AnalysisListResponse {
    pub analyses: Vec<AnalysisResponse>,
    pub count: usize,
}

/// List all stored analyses.
pub async fn list_analyses(
    State(state): State<AppState>,
) -> ApiResult<Json<AnalysisListResponse>> {
    let records = state.store.list().await.map_err(ApiError::from)?;
    let analyses: Vec<AnalysisResponse> =
        records.iter().map(AnalysisResponse::from).collect();
    let count = analyses.len();

    Ok(Json(AnalysisListResponse { analyses, count }))
}

/// Delete analysis response.
#[derive(Serialize)]
pub struct DeleteAnalysisResponse {
    pub success: bool,
    pub video_filename: String,
    pub message: String,
}

/// Delete a stored analysis, allowing the video to be re-analyzed.
pub async fn delete_analysis(
    State(state): State<AppState>,
    Path(video_filename): Path<String>,
) -> ApiResult<Json<DeleteAnalysisResponse>> {
    let kind = state.analyzer.config().analysis_kind;
    let deleted = state
        .store
        .delete(&video_filename, kind)
        .await
        .map_err(ApiError::from)?;

    if !deleted {
        return Err(ApiError::not_found(format!(
            "Analysis not found: {video_filename}"
        )));
    }

    Ok(Json(DeleteAnalysisResponse {
        success: true,
        video_filename,
        message: "Analysis deleted successfully".to_string(),
    }))
}
