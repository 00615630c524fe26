//! API configuration.

/// Server configuration, sourced from the environment.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,

    /// SQLite database URL
    pub database_url: String,

    /// Directory uploaded videos are stored in
    pub upload_dir: String,

    /// Maximum accepted upload size in bytes
    pub max_file_size: u64,

    /// Accepted upload extensions, lowercase with leading dot
    pub supported_formats: Vec<String>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: vec!["*".to_string()],
            database_url: "sqlite://data/rallyvision.db".to_string(),
            upload_dir: "data/videos/raw".to_string(),
            max_file_size: 100 * 1024 * 1024,
            supported_formats: vec![".mp4".to_string(), ".mov".to_string(), ".avi".to_string()],
        }
    }
}

impl ApiConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("HOST").unwrap_or(defaults.host),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                .unwrap_or(defaults.cors_origins),
            database_url: std::env::var("DATABASE_URL").unwrap_or(defaults.database_url),
            upload_dir: std::env::var("UPLOAD_DIR").unwrap_or(defaults.upload_dir),
            max_file_size: std::env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_file_size),
            supported_formats: std::env::var("SUPPORTED_FORMATS")
                .map(|s| s.split(',').map(|f| f.trim().to_lowercase()).collect())
                .unwrap_or(defaults.supported_formats),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.port, 8000);
        assert_eq!(config.max_file_size, 104_857_600);
        assert!(config.supported_formats.contains(&".mp4".to_string()));
    }
}
