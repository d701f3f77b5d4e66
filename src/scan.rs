//! Discovery of image files in a folder.

use std::path::{Path, PathBuf};

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp"];

/// Check if a path has a supported image extension. Matching ignores case.
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Discover image files directly inside `folder`, non-recursively.
///
/// Results are sorted by path so a batch always visits images in the same
/// order. An empty result is not an error.
pub fn scan_folder(folder: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(folder)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && is_image_file(path))
        .collect();

    images.sort();

    log::info!("Scanned folder {:?}: found {} images", folder, images.len());
    Ok(images)
}
