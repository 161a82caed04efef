use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Largest file the upload provider accepts: 10 MB.
pub const DEFAULT_SIZE_LIMIT: u64 = 10 * 1024 * 1024;

#[derive(thiserror::Error, Debug)]
pub enum UploadError {
    #[error("File is too large: {size} bytes, the limit is {limit} bytes")]
    TooLarge { size: u64, limit: u64 },
    #[error("Upload storage error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    Serialize,
    Display,
    EnumString,
    IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum UploadProvider {
    /// Files are written to a directory on the backend's own disk.
    #[default]
    Local,
}

/// Upload plugin settings, shared by the client (size pre-check) and the dev backend (storage).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default)]
    pub provider: UploadProvider,
    #[serde(default = "default_size_limit")]
    pub size_limit: u64,
    #[serde(default = "default_directory")]
    pub directory: PathBuf,
}

fn default_size_limit() -> u64 {
    DEFAULT_SIZE_LIMIT
}

fn default_directory() -> PathBuf {
    PathBuf::from("public/uploads")
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            provider: UploadProvider::default(),
            size_limit: default_size_limit(),
            directory: default_directory(),
        }
    }
}

impl UploadConfig {
    /// Reject files above the size ceiling.
    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        if size > self.size_limit {
            return Err(UploadError::TooLarge {
                size,
                limit: self.size_limit,
            });
        }
        Ok(())
    }

    /// Create the upload directory if it is missing. Returns its path.
    pub fn ensure_directory(&self) -> Result<&Path, UploadError> {
        if !self.directory.exists() {
            tracing::info!("Creating upload directory {}", self.directory.display());
            std::fs::create_dir_all(&self.directory)?;
        }
        Ok(&self.directory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_local_with_ten_megabytes() {
        let config = UploadConfig::default();
        assert_eq!(config.provider, UploadProvider::Local);
        assert_eq!(config.size_limit, 10_485_760);
        assert_eq!(config.provider.to_string(), "local");
        assert_eq!("local".parse::<UploadProvider>().unwrap(), UploadProvider::Local);
    }

    #[test]
    fn size_ceiling_is_inclusive() {
        let config = UploadConfig::default();
        assert!(config.check_size(DEFAULT_SIZE_LIMIT).is_ok());
        assert!(matches!(
            config.check_size(DEFAULT_SIZE_LIMIT + 1),
            Err(UploadError::TooLarge { limit: DEFAULT_SIZE_LIMIT, .. })
        ));
    }

    #[test]
    fn missing_directory_is_created() {
        let root = tempfile::tempdir().unwrap();
        let config = UploadConfig {
            directory: root.path().join("public").join("uploads"),
            ..Default::default()
        };
        let dir = config.ensure_directory().unwrap();
        assert!(dir.is_dir());
        // a second call is a no-op
        config.ensure_directory().unwrap();
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: UploadConfig = serde_json::from_str(r#"{"size_limit": 1024}"#).unwrap();
        assert_eq!(config.size_limit, 1024);
        assert_eq!(config.directory, PathBuf::from("public/uploads"));
    }
}
