//! Reading and writing images and the batch metadata file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use image::RgbImage;
use tempfile::NamedTempFile;

use crate::format::error::FormatError;
use crate::format::metadata::ImageRecord;

/// Decode an image file into an RGB buffer.
pub fn load_image(path: &Path) -> Result<RgbImage, FormatError> {
    let decoded = image::open(path).map_err(|e| FormatError::image(path, e))?;
    let pixels = decoded.to_rgb8();
    log::debug!(
        "Loaded {:?} ({}x{})",
        path,
        pixels.width(),
        pixels.height()
    );
    Ok(pixels)
}

/// Encode an RGB buffer to `path`. The format follows the file extension.
pub fn save_image(pixels: &RgbImage, path: &Path) -> Result<(), FormatError> {
    pixels.save(path).map_err(|e| FormatError::image(path, e))?;
    log::debug!("Wrote {:?}", path);
    Ok(())
}

/// Name shown to the operator: the file name without folder or extension.
pub fn display_name_for(path: &Path) -> String {
    path.file_stem()
        .or_else(|| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Output path for a rendered copy of `source`: same file name under `output_dir`.
pub fn output_path_for(source: &Path, output_dir: &Path) -> Result<PathBuf, FormatError> {
    let file_name = source
        .file_name()
        .ok_or_else(|| FormatError::MissingFileName {
            path: source.to_path_buf(),
        })?;
    Ok(output_dir.join(file_name))
}

/// Write the batch metadata file.
///
/// The JSON is written to a temporary file next to `path` and renamed over
/// it, so a reader sees either the previous file or the complete new one.
pub fn write_records(records: &[ImageRecord], path: &Path) -> Result<(), FormatError> {
    let json = serde_json::to_string_pretty(records)?;

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(json.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| e.error)?;

    log::info!("Saved metadata for {} image(s) to {:?}", records.len(), path);
    Ok(())
}

/// Read a batch metadata file.
pub fn read_records(path: &Path) -> Result<Vec<ImageRecord>, FormatError> {
    let json = fs::read_to_string(path)?;
    let records: Vec<ImageRecord> = serde_json::from_str(&json)?;
    log::info!("Loaded metadata for {} image(s) from {:?}", records.len(), path);
    Ok(records)
}
