//! redactor - batch image redaction
//!
//! An operator walks through a folder of images, draws opaque filled
//! rectangles over the regions to hide and moves on. Every edit can be
//! undone. The result is a JSON metadata file describing every rectangle and
//! a rendered copy of each image.
//!
//! The core is the annotation state machine in [`session`] and [`model`]:
//! rectangles, per-image undo history and the metadata projection in
//! [`format`]. [`batch`] drives it from an [`input::EventSource`] and hands
//! frames to a [`render::Renderer`].

pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod format;
pub mod input;
pub mod keybindings;
pub mod model;
pub mod render;
pub mod scan;
pub mod session;
pub mod undo;

pub use batch::{BatchController, BatchOutcome};
pub use error::EditError;
pub use model::{Annotation, Color, Rectangle, Vertex};
pub use session::{EditSession, SessionState};
