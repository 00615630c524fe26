//! Filesystem-backed video storage.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::error::{StorageError, StorageResult};

/// Video file store rooted at an upload directory.
#[derive(Debug, Clone)]
pub struct VideoStorage {
    upload_dir: PathBuf,
}

impl VideoStorage {
    pub fn new(upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
        }
    }

    /// Create the upload directory if it does not exist.
    pub async fn init(&self) -> StorageResult<()> {
        tokio::fs::create_dir_all(&self.upload_dir).await?;
        info!(dir = %self.upload_dir.display(), "video storage ready");
        Ok(())
    }

    /// Resolve the on-disk path for a stored filename.
    ///
    /// Rejects names that would escape the upload directory.
    pub fn path_for(&self, filename: &str) -> StorageResult<PathBuf> {
        validate_filename(filename)?;
        Ok(self.upload_dir.join(filename))
    }

    /// Whether a file with this name exists in the store.
    pub async fn exists(&self, filename: &str) -> bool {
        match self.path_for(filename) {
            Ok(path) => tokio::fs::try_exists(&path).await.unwrap_or(false),
            Err(_) => false,
        }
    }

    /// Persist uploaded bytes under the given filename; returns the path.
    pub async fn save(&self, filename: &str, contents: &[u8]) -> StorageResult<PathBuf> {
        let path = self.path_for(filename)?;
        tokio::fs::write(&path, contents).await?;
        debug!(file = %path.display(), bytes = contents.len(), "saved upload");
        Ok(path)
    }

    /// Remove a stored file. Returns false when it did not exist.
    pub async fn delete(&self, filename: &str) -> StorageResult<bool> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    /// Size in bytes of a stored file.
    pub async fn file_size(&self, filename: &str) -> StorageResult<u64> {
        let path = self.path_for(filename)?;
        match tokio::fs::metadata(&path).await {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}

fn validate_filename(filename: &str) -> StorageResult<()> {
    if filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..")
    {
        return Err(StorageError::InvalidFilename(filename.to_string()));
    }
    Ok(())
}
