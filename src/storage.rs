//! Local directory that uploaded product images are written to and served from.

use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UploadStore {
    dir: PathBuf,
}

impl UploadStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write `bytes` under a fresh random name and return that name.
    pub async fn save(&self, bytes: &[u8], extension: &str) -> io::Result<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let filename = format!("{}{}", Uuid::new_v4().simple(), extension);
        tokio::fs::write(self.dir.join(&filename), bytes).await?;
        tracing::debug!(%filename, size = bytes.len(), "stored upload");
        Ok(filename)
    }
}

/// Extension (with the leading dot) to store a file under, taken from the
/// client-supplied filename. Anything unusable falls back to `.jpg`.
pub fn extension_for(filename: Option<&str>) -> String {
    filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty() && ext.len() <= 10)
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| ".jpg".to_string())
}
