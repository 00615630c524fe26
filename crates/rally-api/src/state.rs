//! Application state.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;

use rally_db::SqliteStore;
use rally_detect::{init_detector, DetectorConfig};
use rally_pipeline::{Analyzer, PipelineConfig};
use rally_storage::VideoStorage;

use crate::config::ApiConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: ApiConfig,
    pub store: Arc<SqliteStore>,
    pub storage: VideoStorage,
    pub analyzer: Arc<Analyzer>,
}

impl AppState {
    /// Wire up storage, database, detector and analyzer.
    ///
    /// The detector backend is selected here, once per process lifetime.
    pub async fn new(config: ApiConfig) -> anyhow::Result<Self> {
        let storage = VideoStorage::new(&config.upload_dir);
        storage.init().await.context("creating upload directory")?;

        ensure_db_dir(&config.database_url).await?;
        let store = Arc::new(
            SqliteStore::open(&config.database_url)
                .await
                .context("opening database")?,
        );

        let detector = init_detector(DetectorConfig::from_env()).await;
        let analyzer = Arc::new(Analyzer::new(
            detector,
            store.clone(),
            PipelineConfig::from_env(),
        ));

        Ok(Self {
            config,
            store,
            storage,
            analyzer,
        })
    }
}

/// Create the parent directory for a `sqlite://path` URL if needed.
async fn ensure_db_dir(database_url: &str) -> anyhow::Result<()> {
    if let Some(path) = database_url.strip_prefix("sqlite://") {
        if path.contains(":memory:") {
            return Ok(());
        }
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("creating database directory")?;
            }
        }
    }
    Ok(())
}
