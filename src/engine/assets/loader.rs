// Content backend: materializes raw content for a content-relative path

use super::AssetError;
use anyhow::Result;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of raw asset content
///
/// Paths handed to a backend are always relative to the content root.
pub trait ContentBackend: Send + Sync {
    /// Read the content stored at `path`
    fn read(&self, path: &Path) -> Result<Vec<u8>>;

    /// Called after an unload; `expect_large` signals that many resources were
    /// just released and batched reclamation is worthwhile
    fn reclaim(&self, _expect_large: bool) {}
}

pub type SharedBackend = Arc<dyn ContentBackend>;

/// Backend reading content files from disk
#[derive(Debug, Clone)]
pub struct FileBackend {
    base_path: PathBuf,
}

impl FileBackend {
    /// Create a new file backend rooted at `base_path`
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    /// Get the full path for a content-relative path
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        self.base_path.join(path)
    }

}

impl ContentBackend for FileBackend {
    fn read(&self, path: &Path) -> Result<Vec<u8>> {
        let full_path = self.resolve_path(path);

        if !full_path.is_file() {
            return Err(AssetError::NotFound(full_path.display().to_string()).into());
        }

        debug!("Reading {}", full_path.display());
        std::fs::read(&full_path).map_err(|e| AssetError::Io(e).into())
    }

    fn reclaim(&self, expect_large: bool) {
        if expect_large {
            info!("Large unload from {}", self.base_path.display());
        }
    }
}
