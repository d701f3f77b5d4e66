//! Data models for annotations.

mod annotation;
mod color;
mod rectangle;

pub use annotation::Annotation;
pub use color::{Color, ColorParseError};
pub use rectangle::{Bounds, MAX_VERTICES, Rectangle, Vertex};
