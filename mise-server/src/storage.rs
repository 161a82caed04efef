use std::path::PathBuf;

use mise::upload::{UploadConfig, UploadError};
use mise::wire::Media;
use rand::Rng;

/// Writes uploads to the local upload directory; they are served back under `/uploads/`.
#[derive(Clone)]
pub struct LocalStorage {
    config: UploadConfig,
}

impl LocalStorage {
    /// Prepare the upload directory.
    pub fn new(config: UploadConfig) -> Result<Self, UploadError> {
        config.ensure_directory()?;
        Ok(Self { config })
    }

    pub fn directory(&self) -> &PathBuf {
        &self.config.directory
    }

    pub fn size_limit(&self) -> u64 {
        self.config.size_limit
    }

    pub fn check_size(&self, size: u64) -> Result<(), UploadError> {
        self.config.check_size(size)
    }

    /// Store a file and describe it. The returned media has no id yet.
    pub async fn upload_file(
        &self,
        file_name: &str,
        mime: Option<String>,
        content: Vec<u8>,
    ) -> Result<Media, UploadError> {
        self.config.check_size(content.len() as u64)?;
        let stored_name = stored_file_name(file_name, rand::thread_rng().gen());
        tokio::fs::write(self.config.directory.join(&stored_name), &content).await?;
        tracing::info!("Stored upload {} ({} bytes)", stored_name, content.len());
        Ok(Media {
            id: None,
            name: Some(file_name.to_string()),
            alternative_text: None,
            url: Some(format!("/uploads/{}", stored_name)),
            mime,
            size: Some(content.len() as f64 / 1024.0),
            provider: Some(self.config.provider.to_string()),
        })
    }
}

/// Keep the extension and a readable stem, drop anything that could escape the directory.
fn stored_file_name(file_name: &str, salt: u32) -> String {
    let clean: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let clean = clean.trim_start_matches('.');
    let (stem, ext) = match clean.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => (stem, Some(ext)),
        _ => (clean, None),
    };
    let stem = if stem.is_empty() { "upload" } else { stem };
    match ext {
        Some(ext) => format!("{}_{:08x}.{}", stem, salt, ext.to_ascii_lowercase()),
        None => format!("{}_{:08x}", stem, salt),
    }
}
