//! Rectangle value type built from two pointer clicks.

use image::RgbImage;
use serde::{Deserialize, Serialize};

use crate::error::EditError;
use crate::format::{RectangleMetadata, VertexEntry};
use crate::model::Color;

/// Number of vertices that make a rectangle complete.
pub const MAX_VERTICES: usize = 2;

/// A pixel coordinate on an image.
///
/// Bounds are not checked here; painting clips to the image instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Vertex {
    /// Column
    pub x: u32,
    /// Row
    pub y: u32,
}

impl Vertex {
    /// Create a vertex.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Vertex {
    fn from((x, y): (u32, u32)) -> Self {
        Self::new(x, y)
    }
}

/// Inclusive pixel bounds of a complete rectangle, normalized so that
/// `min <= max` on both axes regardless of the click order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bounds {
    /// Left column
    pub min_x: u32,
    /// Top row
    pub min_y: u32,
    /// Right column (inclusive)
    pub max_x: u32,
    /// Bottom row (inclusive)
    pub max_y: u32,
}

impl Bounds {
    /// Normalize two opposite corners.
    pub fn from_corners(a: Vertex, b: Vertex) -> Self {
        Self {
            min_x: a.x.min(b.x),
            min_y: a.y.min(b.y),
            max_x: a.x.max(b.x),
            max_y: a.y.max(b.y),
        }
    }
}

/// An opaque rectangle: up to two vertices and a fill colour.
///
/// The first vertex is where the pointer went down, the second where it was
/// released. Only complete rectangles (two vertices) are committed to an
/// annotation or serialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rectangle {
    vertices: Vec<Vertex>,
    color: Color,
}

impl Rectangle {
    /// Create an empty rectangle that will be filled with `color`.
    pub fn new(color: Color) -> Self {
        Self {
            vertices: Vec::with_capacity(MAX_VERTICES),
            color,
        }
    }

    /// Create a complete rectangle from two corners.
    pub fn from_corners(a: Vertex, b: Vertex, color: Color) -> Self {
        Self {
            vertices: vec![a, b],
            color,
        }
    }

    /// Vertices added so far, in click order.
    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Fill colour.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Append a vertex.
    ///
    /// Fails with [`EditError::Overflow`] when the rectangle is already
    /// complete; the rectangle is left untouched in that case.
    pub fn add_vertex(&mut self, x: u32, y: u32) -> Result<(), EditError> {
        if self.vertices.len() >= MAX_VERTICES {
            return Err(EditError::Overflow { max: MAX_VERTICES });
        }
        self.vertices.push(Vertex::new(x, y));
        Ok(())
    }

    /// True iff exactly two vertices are held.
    pub fn is_complete(&self) -> bool {
        self.vertices.len() == MAX_VERTICES
    }

    /// True if no vertex has been added yet.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Drop all vertices, keeping the colour.
    pub fn clear(&mut self) {
        self.vertices.clear();
    }

    /// The two corners of a complete rectangle.
    pub fn corners(&self) -> Option<(Vertex, Vertex)> {
        match self.vertices.as_slice() {
            [a, b] => Some((*a, *b)),
            _ => None,
        }
    }

    /// Normalized inclusive bounds of a complete rectangle.
    pub fn bounds(&self) -> Option<Bounds> {
        self.corners().map(|(a, b)| Bounds::from_corners(a, b))
    }

    /// Project to the serialized vertex/colour form.
    ///
    /// Returns None for incomplete rectangles, which are never serialized.
    pub fn to_metadata(&self) -> Option<RectangleMetadata> {
        let (a, b) = self.corners()?;
        Some(RectangleMetadata {
            vertices: [VertexEntry::from(a), VertexEntry::from(b)],
            color: self.color,
        })
    }

    /// Fill the rectangle onto `pixels`, clipped to the image.
    ///
    /// Returns false if nothing was painted (incomplete rectangle or fully
    /// outside the image).
    pub fn paint(&self, pixels: &mut RgbImage) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };

        let (width, height) = pixels.dimensions();
        if bounds.min_x >= width || bounds.min_y >= height {
            log::trace!("Rectangle {:?} lies outside {}x{} image", bounds, width, height);
            return false;
        }

        let max_x = bounds.max_x.min(width - 1);
        let max_y = bounds.max_y.min(height - 1);
        let fill = self.color.to_rgb();

        for y in bounds.min_y..=max_y {
            for x in bounds.min_x..=max_x {
                pixels.put_pixel(x, y, fill);
            }
        }
        true
    }
}

impl From<&RectangleMetadata> for Rectangle {
    fn from(metadata: &RectangleMetadata) -> Self {
        let [a, b] = metadata.vertices;
        Self::from_corners(a.into(), b.into(), metadata.color)
    }
}
