//! Saving binary downloads (CSV export, PDFs) to the download directory.

use anyhow::Context;
use api_client::Download;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Downloads {
    dir: PathBuf,
}

impl Downloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Writes `download` as `filename`, replacing any earlier file of that name.
    pub fn save(&self, filename: &str, download: &Download) -> anyhow::Result<PathBuf> {
        std::fs::create_dir_all(&self.dir).with_context(|| {
            format!("Failed to create download directory {}", self.dir.display())
        })?;
        let path = self.dir.join(filename);
        std::fs::write(&path, &download.bytes)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(
            bytes = download.bytes.len(),
            content_type = download.content_type.as_deref().unwrap_or("unknown"),
            "saved download to {}",
            path.display()
        );
        Ok(path)
    }
}
