//! Video record CRUD.

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

use rally_models::{NewVideo, VideoRecord, VideoStatus};

use crate::error::{DbError, DbResult};
use crate::store::SqliteStore;

/// Column list for the `videos` table.
const COLUMNS: &str = "id, filename, file_path, file_size, content_type, duration, fps, \
    width, height, frame_count, status, error_message, created_at, updated_at";

impl SqliteStore {
    /// Insert a new video row. A duplicate filename surfaces as
    /// [`DbError::Conflict`].
    pub async fn create_video(&self, input: &NewVideo) -> DbResult<VideoRecord> {
        let query = format!(
            "INSERT INTO videos \
                (filename, file_path, file_size, content_type, duration, fps, width, height, \
                 frame_count, status, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
             RETURNING {COLUMNS}"
        );

        let meta = input.metadata;
        let row = sqlx::query(&query)
            .bind(&input.filename)
            .bind(&input.file_path)
            .bind(input.file_size)
            .bind(&input.content_type)
            .bind(meta.map(|m| m.duration))
            .bind(meta.map(|m| m.fps))
            .bind(meta.map(|m| m.width as i64))
            .bind(meta.map(|m| m.height as i64))
            .bind(meta.map(|m| m.frame_count as i64))
            .bind(VideoStatus::Uploaded.as_str())
            .bind(Utc::now())
            .fetch_one(self.pool())
            .await
            .map_err(|e| match &e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    DbError::Conflict(input.filename.clone())
                }
                _ => DbError::Sqlx(e),
            })?;

        row_to_video(&row)
    }

    pub async fn get_video(&self, filename: &str) -> DbResult<Option<VideoRecord>> {
        let query = format!("SELECT {COLUMNS} FROM videos WHERE filename = $1");
        let row = sqlx::query(&query)
            .bind(filename)
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_video).transpose()
    }

    pub async fn list_videos(&self) -> DbResult<Vec<VideoRecord>> {
        let query = format!("SELECT {COLUMNS} FROM videos ORDER BY created_at DESC, id DESC");
        let rows = sqlx::query(&query).fetch_all(self.pool()).await?;
        rows.iter().map(row_to_video).collect()
    }

    /// Remove a video row; true when one existed.
    pub async fn delete_video(&self, filename: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM videos WHERE filename = $1")
            .bind(filename)
            .execute(self.pool())
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Update processing status; returns the updated row, `None` when no
    /// video with this filename exists.
    pub async fn update_video_status(
        &self,
        filename: &str,
        status: VideoStatus,
        error_message: Option<&str>,
    ) -> DbResult<Option<VideoRecord>> {
        let query = format!(
            "UPDATE videos SET status = $2, error_message = $3, updated_at = $4 \
             WHERE filename = $1 \
             RETURNING {COLUMNS}"
        );
        let row = sqlx::query(&query)
            .bind(filename)
            .bind(status.as_str())
            .bind(error_message)
            .bind(Utc::now())
            .fetch_optional(self.pool())
            .await?;
        row.as_ref().map(row_to_video).transpose()
    }
}

fn row_to_video(row: &SqliteRow) -> DbResult<VideoRecord> {
    let status_str: String = row.try_get("status")?;
    let status = status_str
        .parse::<VideoStatus>()
        .map_err(|e| DbError::Corrupt(e.to_string()))?;

    Ok(VideoRecord {
        id: row.try_get("id")?,
        filename: row.try_get("filename")?,
        file_path: row.try_get("file_path")?,
        file_size: row.try_get("file_size")?,
        content_type: row.try_get("content_type")?,
        duration: row.try_get("duration")?,
        fps: row.try_get("fps")?,
        width: row.try_get("width")?,
        height: row.try_get("height")?,
        frame_count: row.try_get("frame_count")?,
        status,
        error_message: row.try_get("error_message")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}
