//! Analysis record store.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::debug;

use rally_models::{AnalysisKind, AnalysisRecord, NewAnalysis};

use crate::error::{DbError, DbResult};
use crate::store::SqliteStore;

/// Column list for the `analyses` table.
const COLUMNS: &str = "id, video_filename, analysis_type, total_frames, frames_with_balls, \
    total_ball_detections, average_detections_per_frame, detection_rate, ball_detections, \
    processing_time, model_used, confidence_threshold, created_at, updated_at";

/// Persistence contract for analysis records.
///
/// `put` never deduplicates; the UNIQUE constraint on
/// `(video_filename, analysis_type)` turns a lost race into
/// [`DbError::Conflict`], which callers resolve by re-fetching.
#[async_trait]
pub trait AnalysisStore: Send + Sync {
    async fn get(
        &self,
        video_filename: &str,
        kind: AnalysisKind,
    ) -> DbResult<Option<AnalysisRecord>>;

    /// Insert a new record, assigning its id and creation timestamp.
    async fn put(&self, input: NewAnalysis) -> DbResult<AnalysisRecord>;

    /// Remove a record; true when one existed.
    async fn delete(&self, video_filename: &str, kind: AnalysisKind) -> DbResult<bool>;

    async fn list(&self) -> DbResult<Vec<AnalysisRecord>>;
}

#[async_trait]
impl AnalysisStore for SqliteStore {
    async fn get(
        &self,
        video_filename: &str,
        kind: AnalysisKind,
    ) -> DbResult<Option<AnalysisRecord>> {
        let query = format!(
            "SELECT {COLUMNS} FROM analyses WHERE video_filename = $1 AND analysis_type = $2"
        );
        let row = sqlx::query(&query)
            .bind(video_filename)
            .bind(kind.as_str())
            .fetch_optional(self.pool())
            .await?;

        row.as_ref().map(row_to_analysis).transpose()
    }

    async fn put(&self, input: NewAnalysis) -> DbResult<AnalysisRecord> {
        let detections_json = serde_json::to_string(&input.ball_detections)?;

        let query = format!(
            "INSERT INTO analyses \
                (video_filename, analysis_type, total_frames, frames_with_balls, \
                 total_ball_detections, average_detections_per_frame, detection_rate, \
                 ball_detections, processing_time, model_used, confidence_threshold, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {COLUMNS}"
        );

        let row = sqlx::query(&query)
            .bind(&input.video_filename)
            .bind(input.analysis_type.as_str())
            .bind(input.summary.total_frames as i64)
            .bind(input.summary.frames_with_balls as i64)
            .bind(input.summary.total_ball_detections as i64)
            .bind(input.summary.average_detections_per_frame)
            .bind(input.summary.detection_rate)
            .bind(detections_json)
            .bind(input.processing_time)
            .bind(&input.model_used)
            .bind(input.confidence_threshold)
            .bind(Utc::now())
            .fetch_one(self.pool())
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => DbError::Conflict(
                    format!("{}/{}", input.video_filename, input.analysis_type),
                ),
                _ => DbError::Sqlx(e),
            })?;

        debug!(
            video = %input.video_filename,
            kind = %input.analysis_type,
            "stored analysis record"
        );
        row_to_analysis(&row)
    }

    async fn delete(&self, video_filename: &str, kind: AnalysisKind) -> DbResult<bool> {
        let result = sqlx::query(
            "DELETE FROM analyses WHERE video_filename = $1 AND analysis_type = $2",
        )
        .bind(video_filename)
        .bind(kind.as_str())
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> DbResult<Vec<AnalysisRecord>> {
        let query = format!("SELECT {COLUMNS} FROM analyses ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&query).fetch_all(self.pool()).await?;
        rows.iter().map(row_to_analysis).collect()
    }
}

fn row_to_analysis(row: &SqliteRow) -> DbResult<AnalysisRecord> {
    let kind_str: String = row.try_get("analysis_type")?;
    let analysis_type = kind_str
        .parse::<AnalysisKind>()
        .map_err(|e| DbError::Corrupt(e.to_string()))?;

    Ok(AnalysisRecord {
        id: row.try_get("id")?,
        video_filename: row.try_get("video_filename")?,
        analysis_type,
        total_frames: row.try_get("total_frames")?,
        frames_with_balls: row.try_get("frames_with_balls")?,
        total_ball_detections: row.try_get("total_ball_detections")?,
        average_detections_per_frame: row.try_get("average_detections_per_frame")?,
        detection_rate: row.try_get("detection_rate")?,
        ball_detections: row.try_get("ball_detections")?,
        processing_time: row.try_get("processing_time")?,
        model_used: row.try_get("model_used")?,
        confidence_threshold: row.try_get("confidence_threshold")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
