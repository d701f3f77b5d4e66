//! Per-image annotation state: pixel buffer, committed rectangles and undo
//! history.

use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::error::EditError;
use crate::format::{ImageRecord, Metadata};
use crate::model::Rectangle;
use crate::undo::{Snapshot, UndoConfig, UndoHistory};

/// Annotation state for a single image.
///
/// Owns its pixel buffer exclusively. The only mutations are [`commit`],
/// [`undo`] and [`redo`]; each one keeps the pixel buffer and the rectangle
/// list consistent with each other.
///
/// [`commit`]: Annotation::commit
/// [`undo`]: Annotation::undo
/// [`redo`]: Annotation::redo
#[derive(Debug, Clone)]
pub struct Annotation {
    source_path: PathBuf,
    display_name: String,
    pixels: RgbImage,
    rectangles: Vec<Rectangle>,
    history: UndoHistory,
}

impl Annotation {
    /// Create an annotation with no rectangles and an empty history.
    pub fn new(
        source_path: impl Into<PathBuf>,
        display_name: impl Into<String>,
        pixels: RgbImage,
    ) -> Self {
        Self {
            source_path: source_path.into(),
            display_name: display_name.into(),
            pixels,
            rectangles: Vec::new(),
            history: UndoHistory::new(),
        }
    }

    /// Use a custom undo configuration.
    pub fn with_undo_config(mut self, config: UndoConfig) -> Self {
        self.history = UndoHistory::with_config(config);
        self
    }

    /// Rebuild an annotation from its metadata. History starts empty.
    pub fn from_metadata(metadata: Metadata) -> Self {
        let rectangles = metadata.rectangles.iter().map(Rectangle::from).collect();
        Self {
            source_path: metadata.original_file_path,
            display_name: metadata.display_name,
            pixels: metadata.pixels,
            rectangles,
            history: UndoHistory::new(),
        }
    }

    /// Rebuild an annotation from a saved record by painting its rectangles
    /// onto freshly decoded `pixels`. History starts empty.
    pub fn from_record(
        record: &ImageRecord,
        display_name: impl Into<String>,
        mut pixels: RgbImage,
    ) -> Self {
        let rectangles: Vec<Rectangle> = record.rectangles().collect();
        for rectangle in &rectangles {
            rectangle.paint(&mut pixels);
        }

        Self {
            source_path: record.image.clone(),
            display_name: display_name.into(),
            pixels,
            rectangles,
            history: UndoHistory::new(),
        }
    }

    /// Path of the image this annotation was opened from.
    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Name shown to the operator for this image.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Current pixel buffer with all committed rectangles painted.
    pub fn pixels(&self) -> &RgbImage {
        &self.pixels
    }

    /// Committed rectangles in commit order.
    pub fn rectangles(&self) -> &[Rectangle] {
        &self.rectangles
    }

    /// Number of edits that can be undone.
    pub fn history_len(&self) -> usize {
        self.history.undo_count()
    }

    /// Number of undone edits that can be redone.
    pub fn redo_len(&self) -> usize {
        self.history.redo_count()
    }

    /// Commit a complete rectangle: snapshot, paint, append.
    pub fn commit(&mut self, rectangle: Rectangle) -> Result<(), EditError> {
        if !rectangle.is_complete() {
            return Err(EditError::IncompleteRectangle {
                vertices: rectangle.vertices().len(),
            });
        }

        self.history.push(Snapshot::capture(&self.pixels, &self.rectangles));
        rectangle.paint(&mut self.pixels);
        log::debug!(
            "{}: committed rectangle {:?}",
            self.display_name,
            rectangle.vertices()
        );
        self.rectangles.push(rectangle);
        Ok(())
    }

    /// Restore the state from before the most recent commit.
    ///
    /// Fails with [`EditError::EmptyHistory`] without touching any state when
    /// there is nothing to undo.
    pub fn undo(&mut self) -> Result<(), EditError> {
        let previous = self.history.pop_undo().ok_or(EditError::EmptyHistory)?;
        let replaced = self.restore(previous);
        self.history.push_redo(replaced);
        log::debug!(
            "{}: undo, {} rectangle(s) remain",
            self.display_name,
            self.rectangles.len()
        );
        Ok(())
    }

    /// Re-apply the most recently undone commit.
    ///
    /// Reached through [`EditSession::redo`](crate::session::EditSession::redo)
    /// only; the interactive action set has no redo token.
    pub fn redo(&mut self) -> Result<(), EditError> {
        let next = self.history.pop_redo().ok_or(EditError::NothingToRedo)?;
        let replaced = self.restore(next);
        self.history.push_undo(replaced);
        log::debug!(
            "{}: redo, {} rectangle(s) committed",
            self.display_name,
            self.rectangles.len()
        );
        Ok(())
    }

    /// Swap the live state for `snapshot`, returning the replaced state.
    fn restore(&mut self, snapshot: Snapshot) -> Snapshot {
        let (pixels, rectangles) = snapshot.into_parts();
        Snapshot::from_parts(
            std::mem::replace(&mut self.pixels, pixels),
            std::mem::replace(&mut self.rectangles, rectangles),
        )
    }

    /// Project to metadata. History is not included.
    pub fn to_metadata(&self) -> Metadata {
        Metadata {
            original_file_path: self.source_path.clone(),
            display_name: self.display_name.clone(),
            pixels: self.pixels.clone(),
            rectangles: self
                .rectangles
                .iter()
                .filter_map(Rectangle::to_metadata)
                .collect(),
        }
    }

    /// Consume the annotation into its metadata, dropping the history.
    pub fn into_metadata(self) -> Metadata {
        let rectangles = self
            .rectangles
            .iter()
            .filter_map(Rectangle::to_metadata)
            .collect();
        Metadata {
            original_file_path: self.source_path,
            display_name: self.display_name,
            pixels: self.pixels,
            rectangles,
        }
    }
}
