//! Image catalog - discover sendable images in a folder.
//!
//! CHANGELOG:
//! - 10/17/2026 - Optional case-insensitive extension matching
//! - 10/14/2026 - Initial implementation

use crate::error::{Result, SenderError};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Extensions treated as sendable images.
pub const IMAGE_EXTENSIONS: &[&str] = &[".jpg", ".png"];

/// Lists image files in a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct ImageCatalog {
    /// Match `.JPG`/`.Png` and friends too.
    pub case_insensitive: bool,
}

impl ImageCatalog {
    pub fn new(case_insensitive: bool) -> Self {
        Self { case_insensitive }
    }

    /// List `.jpg`/`.png` files directly inside `folder`.
    ///
    /// Order is whatever the filesystem enumeration yields. Subfolders are
    /// not descended into.
    pub fn list<P: AsRef<Path>>(&self, folder: P) -> Result<Vec<PathBuf>> {
        let folder = folder.as_ref();
        info!("Loading images from folder: {}", folder.display());

        if !folder.is_dir() {
            error!("Images folder '{}' not found.", folder.display());
            return Err(SenderError::DirectoryNotFound(folder.to_path_buf()));
        }

        let mut images = Vec::new();
        for entry in std::fs::read_dir(folder)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if self.is_image_name(&name) {
                images.push(entry.path());
            } else {
                debug!("Skipping non-image file: {}", name);
            }
        }

        if images.is_empty() {
            error!("No valid images found in '{}'.", folder.display());
            return Err(SenderError::EmptyCatalog(folder.to_path_buf()));
        }

        info!("Loaded {} images.", images.len());
        Ok(images)
    }

    /// Whether a file name carries a sendable image extension.
    pub fn is_image_name(&self, name: &str) -> bool {
        if self.case_insensitive {
            let lower = name.to_ascii_lowercase();
            IMAGE_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
        } else {
            IMAGE_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
        }
    }
}
