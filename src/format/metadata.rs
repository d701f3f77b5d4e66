//! Serializable projections of an annotation.
//!
//! [`Metadata`] is the full in-memory projection of an annotation (pixel
//! buffer included, history excluded). [`ImageRecord`] is the per-image entry
//! of the batch JSON file:
//!
//! ```json
//! {
//!     "image": "images/photo1.jpg",
//!     "coordinates": [[{"x": 10, "y": 10}, {"x": 50, "y": 40}]],
//!     "rectangle_color": "#550000"
//! }
//! ```

use std::path::PathBuf;

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::model::{Color, Rectangle, Vertex};

/// A vertex as written to the metadata file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexEntry {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl From<Vertex> for VertexEntry {
    fn from(vertex: Vertex) -> Self {
        Self {
            x: vertex.x,
            y: vertex.y,
        }
    }
}

impl From<VertexEntry> for Vertex {
    fn from(entry: VertexEntry) -> Self {
        Vertex::new(entry.x, entry.y)
    }
}

/// Serialized form of one complete rectangle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RectangleMetadata {
    /// The two corners in click order.
    pub vertices: [VertexEntry; 2],
    /// Fill colour.
    pub color: Color,
}

/// Everything needed to rebuild an annotation, without its undo history.
#[derive(Debug, Clone, PartialEq)]
pub struct Metadata {
    /// Path the image was loaded from.
    pub original_file_path: PathBuf,
    /// Name shown to the operator.
    pub display_name: String,
    /// Pixel buffer with every committed rectangle painted.
    pub pixels: RgbImage,
    /// Committed rectangles in commit order.
    pub rectangles: Vec<RectangleMetadata>,
}

impl Metadata {
    /// Build the batch-file record for this image.
    ///
    /// `color` is the session colour. It is recorded even when no rectangle
    /// was drawn so the file always says how the image would be redacted.
    pub fn to_record(&self, color: Color) -> ImageRecord {
        ImageRecord {
            image: self.original_file_path.clone(),
            coordinates: self.rectangles.iter().map(|r| r.vertices).collect(),
            rectangle_color: color,
        }
    }
}

/// One image entry of the batch metadata file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Path to the source image.
    pub image: PathBuf,
    /// Corner pairs of every committed rectangle.
    pub coordinates: Vec<[VertexEntry; 2]>,
    /// Fill colour of all rectangles on this image.
    pub rectangle_color: Color,
}

impl ImageRecord {
    /// Create a record with no rectangles.
    pub fn new(image: impl Into<PathBuf>, rectangle_color: Color) -> Self {
        Self {
            image: image.into(),
            coordinates: Vec::new(),
            rectangle_color,
        }
    }

    /// Add a rectangle by its corners.
    pub fn with_rectangle(mut self, a: Vertex, b: Vertex) -> Self {
        self.coordinates.push([a.into(), b.into()]);
        self
    }

    /// Rectangles described by this record.
    pub fn rectangles(&self) -> impl Iterator<Item = Rectangle> + '_ {
        self.coordinates
            .iter()
            .map(|[a, b]| Rectangle::from_corners((*a).into(), (*b).into(), self.rectangle_color))
    }
}
