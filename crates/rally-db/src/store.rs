//! Pool construction and schema setup.

use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::info;

use crate::error::DbResult;

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS videos (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    filename TEXT NOT NULL UNIQUE,
    file_path TEXT NOT NULL,
    file_size INTEGER NOT NULL,
    content_type TEXT,
    duration REAL,
    fps REAL,
    width INTEGER,
    height INTEGER,
    frame_count INTEGER,
    status TEXT NOT NULL DEFAULT 'uploaded',
    error_message TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT
);

CREATE TABLE IF NOT EXISTS analyses (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    video_filename TEXT NOT NULL,
    analysis_type TEXT NOT NULL,
    total_frames INTEGER NOT NULL DEFAULT 0,
    frames_with_balls INTEGER NOT NULL DEFAULT 0,
    total_ball_detections INTEGER NOT NULL DEFAULT 0,
    average_detections_per_frame REAL NOT NULL DEFAULT 0,
    detection_rate REAL NOT NULL DEFAULT 0,
    ball_detections TEXT,
    processing_time REAL NOT NULL DEFAULT 0,
    model_used TEXT,
    confidence_threshold REAL NOT NULL DEFAULT 0.5,
    created_at TEXT NOT NULL,
    updated_at TEXT,
    UNIQUE (video_filename, analysis_type)
);

CREATE INDEX IF NOT EXISTS idx_analyses_video ON analyses(video_filename);
"#;

/// SQLite-backed store for video and analysis records.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a database URL, creating the file and schema as needed.
    pub async fn open(database_url: &str) -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5));

        // A shared in-memory database exists per connection; keep a single
        // one so every query sees the same schema.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;

        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    /// Create tables and indexes if they do not exist.
    pub async fn init_schema(&self) -> DbResult<()> {
        sqlx::raw_sql(SCHEMA).execute(&self.pool).await?;
        info!("database schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}
